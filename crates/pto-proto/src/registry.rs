//! Protocol registry and the host-facing entry points.
//!
//! One [`Registry`] per session maps 16-bit IDs to protocols. The intended
//! discipline is write-once-then-read-many: import every schema during setup,
//! then share the registry (e.g. behind an `Arc`) across any number of
//! threads, each encoding and decoding with its own cursor. Mutation needs
//! `&mut self`, so re-registration while traffic is in flight must go through
//! an external lock such as `RwLock<Registry>`.

use std::fmt;

use bytes::Bytes;

use crate::{
    decoder,
    descriptor::{FieldDescriptor, ProtocolDescriptor, build_protocol},
    encoder,
    errors::{CodecError, SchemaError},
    limits::PROTOCOL_SLOTS,
    protocol::Protocol,
    value::Value,
};

/// Numeric protocol identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolId(u16);

impl ProtocolId {
    /// Wrap a raw ID.
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Raw ID.
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl From<u16> for ProtocolId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

impl TryFrom<i64> for ProtocolId {
    type Error = SchemaError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        u16::try_from(id).map(Self).map_err(|_| SchemaError::InvalidProtocolId { id })
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lookup table from [`ProtocolId`] to [`Protocol`].
///
/// Holds at most one protocol per ID. Protocols are owned outright; replacing
/// or removing one drops its whole field tree.
pub struct Registry {
    slots: Vec<Option<Box<Protocol>>>,
    len: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("len", &self.len).finish_non_exhaustive()
    }
}

impl Registry {
    /// Empty registry with every ID unoccupied.
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(PROTOCOL_SLOTS);
        slots.resize_with(PROTOCOL_SLOTS, || None);
        Self { slots, len: 0 }
    }

    /// Register `protocol` under `id`, returning the protocol it displaced.
    ///
    /// Dropping the returned value releases the old field tree.
    pub fn put(&mut self, id: u16, protocol: Protocol) -> Option<Protocol> {
        let slot = &mut self.slots[usize::from(id)];
        let previous = slot.replace(Box::new(protocol));
        if previous.is_none() {
            self.len += 1;
        }
        previous.map(|p| *p)
    }

    /// Protocol registered under `id`.
    pub fn get(&self, id: u16) -> Option<&Protocol> {
        self.slots[usize::from(id)].as_deref()
    }

    /// Unregister `id`, returning its protocol.
    pub fn remove(&mut self, id: u16) -> Option<Protocol> {
        let previous = self.slots[usize::from(id)].take();
        if previous.is_some() {
            self.len -= 1;
        }
        previous.map(|p| *p)
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: u16) -> bool {
        self.get(id).is_some()
    }

    /// Number of registered protocols.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Registered IDs in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ProtocolId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .filter_map(|(i, _)| u16::try_from(i).ok().map(ProtocolId))
    }

    /// Build a protocol from host descriptors and register it under `id`.
    ///
    /// An existing protocol at `id` is released before the new one is
    /// inserted.
    pub fn import_protocol(
        &mut self,
        id: i64,
        name: &str,
        descriptors: &[FieldDescriptor],
    ) -> Result<ProtocolId, SchemaError> {
        let id = ProtocolId::try_from(id)?;
        let protocol = build_protocol(name, descriptors)?;
        self.install(id, protocol);
        Ok(id)
    }

    /// Register a whole protocol descriptor.
    pub fn import_descriptor(
        &mut self,
        descriptor: &ProtocolDescriptor,
    ) -> Result<ProtocolId, SchemaError> {
        let (id, protocol) = descriptor.build()?;
        self.install(id, protocol);
        Ok(id)
    }

    fn install(&mut self, id: ProtocolId, protocol: Protocol) {
        if let Some(old) = self.remove(id.get()) {
            tracing::warn!(%id, old = old.name(), new = protocol.name(), "replacing protocol");
            drop(old);
        }

        tracing::debug!(
            %id,
            name = protocol.name(),
            fields = protocol.field_count(),
            depth = protocol.max_depth(),
            "imported protocol"
        );
        self.put(id.get(), protocol);
    }

    fn lookup(&self, id: u16) -> Result<&Protocol, CodecError> {
        self.get(id).ok_or(CodecError::UnknownProtocol { id })
    }

    /// Encode `value` with the protocol registered under `id`.
    pub fn encode(&self, id: u16, value: &Value) -> Result<Bytes, CodecError> {
        encoder::encode(self.lookup(id)?, value)
    }

    /// Decode `input` with the protocol registered under `id`.
    pub fn decode(&self, id: u16, input: &[u8]) -> Result<Value, CodecError> {
        decoder::decode(self.lookup(id)?, input)
    }

    /// Decode `input` without copying string payloads out of it.
    pub fn decode_bytes(&self, id: u16, input: Bytes) -> Result<Value, CodecError> {
        decoder::decode_bytes(self.lookup(id)?, input)
    }
}
