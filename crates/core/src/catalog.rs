//! Service catalog: the authoritative mapping from service-type name to
//! credit cost.
//!
//! Every cost lookup -- the optimistic affordability check and the
//! transactional spend -- reads through [`cost`]. The `service_types`
//! table is seeded with the same values at deployment time; this module
//! is the single in-process source of truth.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Service type names
// ---------------------------------------------------------------------------

/// Text-to-3D mesh generation (untextured preview).
pub const SERVICE_TEXT_TO_3D_PREVIEW: &str = "text-to-3d-preview";
/// Text-to-3D refine pass (textured, optionally PBR-mapped).
pub const SERVICE_TEXT_TO_3D_OPTIMIZED: &str = "text-to-3d-optimized";
/// Image-based model generation.
pub const SERVICE_IMAGE_GENERATION: &str = "image-generation";

pub const VALID_SERVICE_TYPES: &[&str] = &[
    SERVICE_TEXT_TO_3D_PREVIEW,
    SERVICE_TEXT_TO_3D_OPTIMIZED,
    SERVICE_IMAGE_GENERATION,
];

// ---------------------------------------------------------------------------
// Costs
// ---------------------------------------------------------------------------

/// Credit cost of a preview generation.
pub const COST_TEXT_TO_3D_PREVIEW: i32 = 5;
/// Credit cost of an optimized (refine) generation.
pub const COST_TEXT_TO_3D_OPTIMIZED: i32 = 10;
/// Credit cost of an image-based generation.
pub const COST_IMAGE_GENERATION: i32 = 5;

/// Look up the credit cost of a service type.
///
/// Fails with [`CoreError::UnknownServiceType`] for names outside the
/// fixed catalog.
pub fn cost(service_type: &str) -> Result<i32, CoreError> {
    match service_type {
        SERVICE_TEXT_TO_3D_PREVIEW => Ok(COST_TEXT_TO_3D_PREVIEW),
        SERVICE_TEXT_TO_3D_OPTIMIZED => Ok(COST_TEXT_TO_3D_OPTIMIZED),
        SERVICE_IMAGE_GENERATION => Ok(COST_IMAGE_GENERATION),
        other => Err(CoreError::UnknownServiceType(other.to_string())),
    }
}

/// Check whether `service_type` is one of the catalog names.
pub fn is_valid_service_type(service_type: &str) -> bool {
    VALID_SERVICE_TYPES.contains(&service_type)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
