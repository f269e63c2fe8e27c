// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

#![doc(html_logo_url = "https://raw.githubusercontent.com/vulkano-rs/vulkano/master/logo.png")]
//! Validation of a Vulkan object graph without a Vulkan device.
//!
//! This crate checks the descriptions you would hand to Vulkan when creating render passes,
//! framebuffers, descriptor set layouts, descriptor pools and descriptor sets, and when updating
//! descriptor sets. It also tracks which objects are referenced by recorded command sequences, so
//! that destroying an object that is still in use, or submitting work that references a destroyed
//! object, is caught before it would reach a driver.
//!
//! # Starting off
//!
//! Everything happens inside an [`ObjectGraph`]. It is created from a [`CapabilitySet`], which
//! describes the API version, features, extensions and limits of the device being validated
//! against. Objects are created with the `create_*` methods of the graph, which return a typed
//! [`Id`] on success and a [`ValidationReport`] on failure. An object that fails validation is
//! never inserted.
//!
//! ```
//! use vulkano_validation::{
//!     format::Format,
//!     image::{ImageLayout, SampleCount},
//!     render_pass::{
//!         AttachmentDescription, AttachmentReference, LoadOp, RenderPassCreateInfo, StoreOp,
//!         SubpassDescription,
//!     },
//!     CapabilitySet, ObjectGraph,
//! };
//!
//! let mut graph = ObjectGraph::new(CapabilitySet::new());
//! let render_pass = graph
//!     .create_render_pass(RenderPassCreateInfo {
//!         attachments: vec![AttachmentDescription {
//!             format: Format::R8G8B8A8_UNORM,
//!             samples: SampleCount::Sample1,
//!             load_op: LoadOp::Clear,
//!             store_op: StoreOp::Store,
//!             final_layout: ImageLayout::ColorAttachmentOptimal,
//!             ..Default::default()
//!         }],
//!         subpasses: vec![SubpassDescription {
//!             color_attachments: vec![Some(AttachmentReference {
//!                 attachment: 0,
//!                 layout: ImageLayout::ColorAttachmentOptimal,
//!                 ..Default::default()
//!             })],
//!             ..Default::default()
//!         }],
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! assert!(graph.get(render_pass).is_ok());
//! ```
//!
//! # Errors
//!
//! Every violated rule is reported as a [`ValidationError`]. Each error carries the Vulkan valid
//! usage IDs (VUIDs) of the rule it checks, which are stable across versions of this crate and can
//! be looked up in the Vulkan specification. A [`ValidationReport`] collects the errors of one
//! call. Depending on the [`ValidationMode`], evaluation stops at the first violation or continues
//! with every rule that does not depend on an earlier failure.
//!
//! # Logging
//!
//! Violations are returned, never logged. The crate emits `trace`-level records through the `log`
//! facade for object creation and destruction and for command sequence state changes.

pub use crate::{
    capabilities::{CapabilitySet, DeviceCapabilities},
    graph::{Id, InvalidSlotError, ObjectGraph, ObjectId, ObjectType, SharedGraph},
    report::{ErrorKind, RuleId, ValidationMode, ValidationReport},
};
use std::{
    borrow::Cow,
    error::Error,
    fmt::{Debug, Display, Error as FmtError, Formatter},
};

#[macro_use]
mod macros;
pub mod buffer;
pub mod capabilities;
pub mod descriptor_set;
pub mod format;
pub mod framebuffer;
mod graph;
pub mod image;
pub mod lifetime;
pub mod render_pass;
mod report;
pub mod sampler;
mod slotmap;
pub mod sync;

/// Represents memory size and offset values on a Vulkan device.
/// Analogous to the Rust `usize` type on the host.
pub type DeviceSize = u64;

/// Represents an API version of Vulkan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version {
    /// Major version number.
    pub major: u32,
    /// Minor version number.
    pub minor: u32,
    /// Patch version number.
    pub patch: u32,
}

impl Version {
    pub const V1_0: Version = Version::major_minor(1, 0);
    pub const V1_1: Version = Version::major_minor(1, 1);
    pub const V1_2: Version = Version::major_minor(1, 2);
    pub const V1_3: Version = Version::major_minor(1, 3);

    /// Constructs a `Version` from the given major and minor version numbers.
    #[inline]
    pub const fn major_minor(major: u32, minor: u32) -> Version {
        Version {
            major,
            minor,
            patch: 0,
        }
    }
}

impl Default for Version {
    #[inline]
    fn default() -> Self {
        Self::V1_0
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A helper type for non-exhaustive structs.
///
/// This type cannot be constructed outside this crate. Structures that have a field of this type
/// can therefore not be constructed outside this crate either, except by using
/// `..Default::default()` for the remaining fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NonExhaustive(pub(crate) ());

impl Debug for NonExhaustive {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.write_str("NonExhaustive")
    }
}

/// The arguments or other context of a call to a validation function, failed to satisfy one of the
/// rules of the Vulkan specification.
#[derive(Clone, Default)]
pub struct ValidationError {
    /// The context in which the problem exists (e.g. a specific parameter).
    pub context: Cow<'static, str>,

    /// A description of the problem.
    pub problem: Cow<'static, str>,

    /// If applicable, settings that the user could enable to avoid the problem in the future.
    pub requires_one_of: RequiresOneOf,

    /// *Valid Usage IDs* (VUIDs) in the Vulkan specification that relate to the problem.
    pub vuids: &'static [&'static str],

    /// The kind of problem, if it is not a missing capability.
    pub kind: ErrorKind,
}

impl ValidationError {
    /// Returns the kind of error. An error that lists required capabilities is always a
    /// capability error, regardless of `kind`.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        if self.requires_one_of.is_empty() {
            self.kind
        } else {
            ErrorKind::Capability
        }
    }

    /// Returns the first VUID of the error, which identifies the rule that was violated.
    #[inline]
    pub fn rule_id(&self) -> Option<RuleId> {
        self.vuids.first().copied()
    }

    pub(crate) fn add_context(
        mut self: Box<Self>,
        context: impl Into<Cow<'static, str>>,
    ) -> Box<Self> {
        let context = context.into();

        if self.context.is_empty() {
            self.context = context;
        } else {
            self.context = format!("{}.{}", context, self.context).into();
        }

        self
    }

    pub(crate) fn set_vuids(mut self: Box<Self>, vuids: &'static [&'static str]) -> Box<Self> {
        self.vuids = vuids;
        self
    }
}

impl Debug for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        if self.context.is_empty() {
            write!(f, "{}", self.problem)?;
        } else {
            write!(f, "{}: {}", self.context, self.problem)?;
        }

        if !self.requires_one_of.is_empty() {
            write!(f, "\n\n{}", self.requires_one_of)?;
        }

        if !self.vuids.is_empty() {
            write!(f, "\n\nVulkan VUIDs:")?;

            for vuid in self.vuids {
                write!(f, "\n    {}", vuid)?;
            }
        }

        Ok(())
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        if self.context.is_empty() {
            write!(f, "{}", self.problem)?;
        } else {
            write!(f, "{}: {}", self.context, self.problem)?;
        }

        if !self.requires_one_of.is_empty() {
            if self.problem.is_empty() {
                write!(f, "{}", self.requires_one_of)?;
            } else {
                write!(f, " -- {}", self.requires_one_of)?;
            }
        }

        if let Some((first, rest)) = self.vuids.split_first() {
            write!(f, " (Vulkan VUIDs: {}", first)?;

            for vuid in rest {
                write!(f, ", {}", vuid)?;
            }

            write!(f, ")")?;
        }

        Ok(())
    }
}

impl Error for ValidationError {}

/// Used in errors to indicate a set of alternatives that needs to be available/enabled to allow
/// a given operation.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct RequiresOneOf(pub &'static [RequiresAllOf]);

impl RequiresOneOf {
    /// Returns the number of alternatives.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are any alternatives.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for RequiresOneOf {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        Display::fmt(self, f)
    }
}

impl Display for RequiresOneOf {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "requires one of: ")?;

        if let Some((first, rest)) = self.0.split_first() {
            if first.0.len() > 1 {
                write!(f, "({})", first)?;
            } else {
                write!(f, "{}", first)?;
            }

            for rest in rest {
                if first.0.len() > 1 {
                    write!(f, " or ({})", rest)?;
                } else {
                    write!(f, " or {}", rest)?;
                }
            }
        }

        Ok(())
    }
}

/// Used in errors to indicate a set of requirements that all need to be available/enabled to
/// allow a given operation.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct RequiresAllOf(pub &'static [Requires]);

impl Debug for RequiresAllOf {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        Display::fmt(self, f)
    }
}

impl Display for RequiresAllOf {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        if let Some((first, rest)) = self.0.split_first() {
            write!(f, "{}", first)?;

            for rest in rest {
                write!(f, " + {}", rest)?;
            }
        }

        Ok(())
    }
}

/// Something that needs to be supported or enabled to allow a particular operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requires {
    APIVersion(Version),
    DeviceFeature(&'static str),
    DeviceExtension(&'static str),
}

impl Display for Requires {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Requires::APIVersion(Version { major, minor, .. }) => {
                write!(f, "Vulkan API version {}.{}", major, minor)
            }
            Requires::DeviceFeature(device_feature) => {
                write!(f, "device feature `{}`", device_feature)
            }
            Requires::DeviceExtension(device_extension) => {
                write!(f, "device extension `{}`", device_extension)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_prepended() {
        let err = Box::new(ValidationError {
            context: "layout".into(),
            problem: "is not valid".into(),
            vuids: &["VUID-test-00001"],
            ..Default::default()
        })
        .add_context("attachments[2]")
        .add_context("create_info");

        assert_eq!(err.context, "create_info.attachments[2].layout");
        assert_eq!(err.rule_id(), Some("VUID-test-00001"));
        assert_eq!(
            err.to_string(),
            "create_info.attachments[2].layout: is not valid (Vulkan VUIDs: VUID-test-00001)",
        );
    }

    #[test]
    fn requirements_make_capability_errors() {
        let err = ValidationError {
            problem: "is `PipelineStages::GEOMETRY_SHADER`".into(),
            requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                "geometry_shader",
            )])]),
            ..Default::default()
        };

        assert_eq!(err.kind(), ErrorKind::Capability);
        assert_eq!(
            err.requires_one_of.to_string(),
            "requires one of: device feature `geometry_shader`",
        );
    }

    #[test]
    fn versions_are_ordered() {
        assert!(Version::V1_3 > Version::V1_2);
        assert!(Version::major_minor(1, 2) >= Version::V1_2);
        assert_eq!(Version::V1_1.to_string(), "1.1.0");
    }
}
