//! Readers and writers for lexfst automata.
//!
//! Every reader implements [`lexfst::StateIterator`], so a file can be
//! loaded straight into either representation without an intermediate copy:
//!
//! - [`att`] -- AT&T tab-separated text
//! - [`binary`] -- the native compact binary format
//! - [`hfst`] -- binary transducers written by HFST (OpenFST backend), read only
//! - [`producer`] -- symbol spelling conventions of the toolkits that write these files

pub mod att;
pub mod binary;
mod cursor;
pub mod hfst;
pub mod producer;

pub use lexfst::FstError;
pub use producer::Producer;

use lexfst::MutableTransducer;

/// Read a binary automaton written by `producer`.
///
/// [`Producer::Native`] selects the native format, the HFST producers the
/// HFST reader. SFST binaries are not supported.
pub fn read_binary(
    bytes: &[u8],
    producer: Producer,
    inverse: bool,
) -> Result<MutableTransducer, FstError> {
    match producer {
        Producer::Native => binary::read(bytes, inverse),
        Producer::HfstInternal | Producer::HfstAtt => hfst::read(bytes, inverse),
        Producer::Sfst => Err(FstError::UnsupportedProducer(
            "SFST binary files cannot be read".to_string(),
        )),
    }
}
