// ── Storage layer ──
//
// Two stores with different audiences: the publication store makes
// peripheral models visible to the application, the device store keeps
// learned identifiers across sessions.

mod device_store;
mod peripheral_store;
mod slot;

pub use device_store::{DeviceStore, FileDeviceStore, MemoryDeviceStore};
pub use peripheral_store::{PeripheralStore, StoredModel};
pub use slot::PublicationSlot;
