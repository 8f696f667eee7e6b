//! Desktop glue for the shadowing deck: file-backed storage, the synthesis
//! endpoint client, process-backed speech and playback, terminal input and a
//! text renderer.

pub mod input;
pub mod network;
pub mod render;
pub mod speech;
pub mod storage;
