//! Foundation types for the generator.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`PackageId`], [`ClassId`], [`EnumId`], [`AssociationId`], [`InstanceId`] - arena handles
//! - [`LineCol`], [`LineIndex`] - Line/column conversion for XML error positions
//!
//! This module has NO dependencies on other xmigen modules.

mod ids;
mod span;

pub use ids::{AssociationId, ClassId, EnumId, InstanceId, PackageId};
pub use span::{LineCol, LineIndex, TextSize};
