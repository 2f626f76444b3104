//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod asset_transport;
mod record_store;
mod upload_override_store;

#[cfg(test)]
pub use asset_transport::MockAssetTransport;
pub use asset_transport::{AssetTransport, AssetTransportError, AssetUploadRequest};
#[cfg(test)]
pub use record_store::MockRecordStore;
pub use record_store::{Collection, Document, RecordStore, RecordStoreError, WriteOutcome};
#[cfg(test)]
pub use upload_override_store::MockUploadOverrideStore;
pub use upload_override_store::{
    NoUploadOverride, UploadOverrideStore, UploadOverrideStoreError,
};
