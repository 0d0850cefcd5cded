//! NFS message layer for the saorsa network.
//!
//! This module defines what a client and the storage-network personas say to
//! each other: domain-qualified error codes, the response envelopes that carry
//! them, and the request/response messages that wrap both.
//!
//! # Error Codes
//!
//! Every failure is an [`ErrorCode`]: one condition from one of several
//! independently versioned domains (common, crypto, identity, nfs, routing,
//! drive, vault, api). A [`ReturnCode`] is either success or one such code.
//! Decoding is strict: an unknown domain is [`ProtocolError::UnknownErrorDomain`],
//! never a generic failure and never success.
//!
//! # Envelopes
//!
//! - [`PlainResponse`], [`DataNameResponse`], [`TipOfTreeResponse`], ... -
//!   payload plus return code
//! - [`DataNamesResponse`] - set of names plus return code
//! - [`ContentResponse`] - content XOR failure
//! - [`StructuredDataResponse`] - versions XOR name plus failure
//!
//! Callers classify any envelope through [`Classify`] / [`is_success`] /
//! [`error_of`] without matching on its fields.
//!
//! # Example
//!
//! ```rust,ignore
//! use saorsa_nfs::nfs_protocol::{NfsMessage, NfsMessageBody, DataName};
//!
//! let request = NfsMessage::new(NfsMessageBody::GetRequest { name });
//! let bytes = request.encode()?;
//!
//! let response = NfsMessage::decode(&response_bytes)?;
//! ```

pub mod codec;
pub mod data;
pub mod envelope;
pub mod error_code;
pub mod message;
pub mod outcome;
pub mod return_code;

/// Protocol identifier for NFS operations.
pub const NFS_PROTOCOL_ID: &str = "saorsa/nfs/v1";

pub use codec::{ProtocolError, WireFormat, MAX_CONTENT_SIZE, MAX_WIRE_MESSAGE_SIZE};
pub use data::{
    compute_address, Content, DataAndPmidHint, DataName, DataNameAndContent, DataNameAndVersion,
    DataNameOldNewVersion, DataTagValue, PmidHealth, PmidRegistration, StructuredData,
    VersionName, XorName,
};
pub use envelope::{
    AvailableSizeResponse, ContentOrError, ContentResponse, DataNameAndSpaceResponse,
    DataNameOldNewVersionResponse, DataNameResponse, DataNameVersionResponse, DataNamesResponse,
    DataPmidHintResponse, DataResponse, PlainResponse, PmidHealthResponse,
    PmidRegistrationResponse, StructuredDataResponse, TipOfTreeResponse,
};
pub use error_code::{
    ApiError, AsymmError, CommonError, DriveError, ErrorCode, ErrorDomain, NfsError,
    PassportError, RoutingError, VaultError,
};
pub use message::{NfsMessage, NfsMessageBody, NfsMessageBodyWire, NfsMessageWire, Persona};
pub use outcome::{error_of, is_success, Classify, Outcome};
pub use return_code::ReturnCode;
