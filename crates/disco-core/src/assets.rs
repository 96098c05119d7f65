//! Readiness gate over the assets a render session needs.
//!
//! The matcap texture and every ball's source geometry load independently.
//! [`AssetGate`] records each named slot's outcome and only hands out a
//! [`ResolvedAssets`] bundle once every slot has settled, so the frame loop
//! can never start with a ball or texture missing.

use crate::geometry::RawSurface;
use crate::matcap::MatcapImage;
use crate::primitives::Primitive;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssetError {
    #[error("failed to load {key}: {reason}")]
    LoadFailed { key: AssetKey, reason: String },
    #[error("invalid primitive {0}")]
    InvalidPrimitive(String),
    #[error("matcap image {width}x{height} expects {expected} bytes, got {actual}")]
    MalformedImage {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("{0} was already resolved")]
    AlreadyResolved(AssetKey),
    #[error("no slot named {0}")]
    UnknownSlot(AssetKey),
}

/// Name of one required asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKey {
    Matcap,
    Geometry(usize),
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKey::Matcap => write!(f, "matcap"),
            AssetKey::Geometry(i) => write!(f, "geometry[{i}]"),
        }
    }
}

#[derive(Clone, Debug)]
enum Slot<T> {
    Pending,
    Loaded(T),
    Failed(AssetError),
}

impl<T> Slot<T> {
    fn is_settled(&self) -> bool {
        !matches!(self, Slot::Pending)
    }
}

/// Everything a session needs, with failed slots already replaced by
/// placeholders.
#[derive(Clone, Debug)]
pub struct ResolvedAssets {
    pub matcap: MatcapImage,
    pub geometries: Vec<RawSurface>,
    pub failures: Vec<AssetError>,
}

#[derive(Clone, Debug)]
pub struct AssetGate {
    matcap: Slot<MatcapImage>,
    geometries: Vec<Slot<RawSurface>>,
}

impl AssetGate {
    /// Gate over the matcap plus `geometry_count` ball geometries.
    pub fn new(geometry_count: usize) -> Self {
        Self {
            matcap: Slot::Pending,
            geometries: (0..geometry_count).map(|_| Slot::Pending).collect(),
        }
    }

    pub fn resolve_matcap(&mut self, result: Result<MatcapImage, AssetError>) -> Result<(), AssetError> {
        if self.matcap.is_settled() {
            return Err(AssetError::AlreadyResolved(AssetKey::Matcap));
        }
        self.matcap = settle(AssetKey::Matcap, result);
        Ok(())
    }

    pub fn resolve_geometry(
        &mut self,
        index: usize,
        result: Result<RawSurface, AssetError>,
    ) -> Result<(), AssetError> {
        let key = AssetKey::Geometry(index);
        let slot = self
            .geometries
            .get_mut(index)
            .ok_or(AssetError::UnknownSlot(key))?;
        if slot.is_settled() {
            return Err(AssetError::AlreadyResolved(key));
        }
        *slot = settle(key, result);
        Ok(())
    }

    /// Slots that have not reported yet.
    pub fn pending(&self) -> Vec<AssetKey> {
        let mut out = Vec::new();
        if !self.matcap.is_settled() {
            out.push(AssetKey::Matcap);
        }
        for (i, g) in self.geometries.iter().enumerate() {
            if !g.is_settled() {
                out.push(AssetKey::Geometry(i));
            }
        }
        out
    }

    pub fn is_settled(&self) -> bool {
        self.matcap.is_settled() && self.geometries.iter().all(Slot::is_settled)
    }

    /// Bundle the settled assets, or `None` while anything is still pending.
    ///
    /// A failed matcap becomes the procedural matcap; a failed geometry
    /// becomes `fallback_geometry`.
    pub fn resolve(&self, fallback_geometry: &Primitive) -> Option<ResolvedAssets> {
        if !self.is_settled() {
            return None;
        }
        let mut failures = Vec::new();
        let matcap = match &self.matcap {
            Slot::Loaded(m) => m.clone(),
            Slot::Failed(e) => {
                failures.push(e.clone());
                MatcapImage::procedural_default()
            }
            Slot::Pending => return None,
        };
        let mut geometries = Vec::with_capacity(self.geometries.len());
        for slot in &self.geometries {
            match slot {
                Slot::Loaded(g) => geometries.push(g.clone()),
                Slot::Failed(e) => {
                    failures.push(e.clone());
                    // an invalid fallback degrades to an empty ball
                    geometries.push(fallback_geometry.build().unwrap_or_default());
                }
                Slot::Pending => return None,
            }
        }
        Some(ResolvedAssets {
            matcap,
            geometries,
            failures,
        })
    }
}

fn settle<T>(key: AssetKey, result: Result<T, AssetError>) -> Slot<T> {
    match result {
        Ok(v) => {
            log::info!("[assets] {key} ready");
            Slot::Loaded(v)
        }
        Err(e) => {
            log::warn!("[assets] {key} failed, using placeholder: {e}");
            Slot::Failed(e)
        }
    }
}
