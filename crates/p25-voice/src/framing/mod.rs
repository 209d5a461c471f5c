//! LDU framing: the transmit-side assembler, the receive-side disassembler, and the
//! record-stream codec between the 225-byte scratch buffers and the 154-byte wire form.

pub mod assembler;
pub mod disassembler;
pub mod records;
