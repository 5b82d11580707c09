//! Wire protocol for the quill DSU client.
//!
//! This crate defines the "language" spoken with a DSU server:
//!
//! - **Types** ([`JoinRequest`], [`SendRequest`], [`FetchRequest`],
//!   [`Response`], [`Timestamp`], …) — the shapes that travel on the wire.
//! - **Codec** ([`FrameCodec`] trait, [`JsonLineCodec`]) — how those
//!   shapes become CRLF-terminated JSON frames and back.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (authentication state). It performs no I/O and holds no state — it
//! only knows how to serialize requests and classify responses.
//!
//! ```text
//! Transport (bytes) → Protocol (Request/Response) → Session (token)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{FRAME_DELIMITER, FrameCodec, JsonLineCodec, decode_response};
pub use error::ProtocolError;
pub use types::{
    DirectMessage, FetchMode, FetchRequest, JoinPayload, JoinRequest, Response,
    ResponsePayload, STATUS_ERROR, STATUS_OK, SendRequest, Timestamp, WireMessage,
};
