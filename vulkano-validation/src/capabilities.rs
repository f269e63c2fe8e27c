// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The capabilities of the device that an object graph is validated against.
//!
//! Many rules only apply, or only forbid something, depending on whether a feature or extension
//! is enabled, or on the value of a device limit. Rather than querying a device, every rule reads
//! from a [`CapabilitySet`], which is a snapshot of the API version, the enabled features and
//! extensions, and the limits.
//!
//! Features and extensions are named the way vulkano names them: `snake_case`, without the
//! `VK_` prefix for extensions (e.g. `separate_depth_stencil_layouts`, `khr_push_descriptor`).
//! Limits are named after the fields of `VkPhysicalDeviceLimits` and the property structs that
//! extend it, also in `snake_case` (e.g. `max_color_attachments`).

use crate::{Requires, RequiresOneOf, Version};
use foldhash::{HashMap, HashSet};

/// Something that can tell which features and extensions are enabled on a device, and the values
/// of its limits.
pub trait DeviceCapabilities {
    /// Returns the Vulkan API version of the device.
    #[inline]
    fn api_version(&self) -> Version {
        Version::V1_0
    }

    /// Returns whether the feature with the given name is enabled.
    fn is_feature_enabled(&self, name: &str) -> bool;

    /// Returns whether the extension with the given name is enabled.
    fn is_extension_enabled(&self, name: &str) -> bool;

    /// Returns the value of the limit with the given name.
    fn device_limit(&self, name: &str) -> u64;
}

/// The minimum values the Vulkan specification guarantees for the limits that rules consult.
/// For `min_*` limits this is the largest value an implementation may report.
const GUARANTEED_LIMITS: &[(&str, u64)] = &[
    ("max_color_attachments", 4),
    ("max_framebuffer_height", 4096),
    ("max_framebuffer_layers", 256),
    ("max_framebuffer_width", 4096),
    ("max_inline_uniform_block_size", 256),
    ("max_multiview_view_count", 6),
    ("max_push_descriptors", 32),
    ("max_storage_buffer_range", 1 << 27),
    ("max_uniform_buffer_range", 16384),
    ("min_storage_buffer_offset_alignment", 256),
    ("min_texel_buffer_offset_alignment", 256),
    ("min_uniform_buffer_offset_alignment", 256),
];

/// A snapshot of the capabilities of a device.
///
/// A newly created set describes a Vulkan 1.0 device with no features or extensions enabled, and
/// with every limit at the minimum value the specification guarantees.
#[derive(Clone, Debug)]
pub struct CapabilitySet {
    api_version: Version,
    features: HashSet<String>,
    extensions: HashSet<String>,
    limits: HashMap<String, u64>,
}

impl CapabilitySet {
    /// Returns a set with no features or extensions enabled.
    #[inline]
    pub fn new() -> Self {
        CapabilitySet {
            api_version: Version::V1_0,
            features: HashSet::default(),
            extensions: HashSet::default(),
            limits: HashMap::default(),
        }
    }

    /// Takes a snapshot of `source`. Only the listed features and extensions are queried. Every
    /// limit that a rule in this crate consults is queried.
    pub fn from_source(
        source: &impl DeviceCapabilities,
        feature_names: &[&str],
        extension_names: &[&str],
    ) -> Self {
        let mut capabilities = CapabilitySet::new().with_api_version(source.api_version());

        for &name in feature_names {
            if source.is_feature_enabled(name) {
                capabilities.features.insert(name.to_owned());
            }
        }

        for &name in extension_names {
            if source.is_extension_enabled(name) {
                capabilities.extensions.insert(name.to_owned());
            }
        }

        for &(name, _) in GUARANTEED_LIMITS {
            capabilities
                .limits
                .insert(name.to_owned(), source.device_limit(name));
        }

        capabilities
    }

    /// Sets the API version.
    #[inline]
    pub fn with_api_version(mut self, api_version: Version) -> Self {
        self.api_version = api_version;
        self
    }

    /// Enables a feature.
    #[inline]
    pub fn with_feature(mut self, name: impl Into<String>) -> Self {
        self.features.insert(name.into());
        self
    }

    /// Enables an extension.
    #[inline]
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.extensions.insert(name.into());
        self
    }

    /// Overrides the value of a limit.
    #[inline]
    pub fn with_limit(mut self, name: impl Into<String>, value: u64) -> Self {
        self.limits.insert(name.into(), value);
        self
    }

    /// Returns the API version.
    #[inline]
    pub fn api_version(&self) -> Version {
        self.api_version
    }

    /// Returns whether the feature with the given name is enabled.
    #[inline]
    pub fn is_feature_enabled(&self, name: &str) -> bool {
        self.features.contains(name)
    }

    /// Returns whether the extension with the given name is enabled.
    #[inline]
    pub fn is_extension_enabled(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    /// Returns the value of a limit. Limits that were not set explicitly have the minimum value
    /// guaranteed by the Vulkan specification. Unknown limits are 0.
    pub fn device_limit(&self, name: &str) -> u64 {
        self.limits.get(name).copied().unwrap_or_else(|| {
            GUARANTEED_LIMITS
                .iter()
                .find(|&&(limit, _)| limit == name)
                .map_or(0, |&(_, value)| value)
        })
    }

    /// Returns whether at least one of the alternatives in `requires_one_of` is fully met.
    pub(crate) fn satisfies(&self, requires_one_of: RequiresOneOf) -> bool {
        requires_one_of.0.iter().any(|all_of| {
            all_of.0.iter().all(|requires| match *requires {
                Requires::APIVersion(version) => self.api_version >= version,
                Requires::DeviceFeature(name) => self.is_feature_enabled(name),
                Requires::DeviceExtension(name) => self.is_extension_enabled(name),
            })
        })
    }

    /// Returns the names of all enabled features, in no particular order.
    #[inline]
    pub fn enabled_features(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(String::as_str)
    }

    /// Returns the names of all enabled extensions, in no particular order.
    #[inline]
    pub fn enabled_extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

impl Default for CapabilitySet {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceCapabilities for CapabilitySet {
    #[inline]
    fn api_version(&self) -> Version {
        self.api_version
    }

    #[inline]
    fn is_feature_enabled(&self, name: &str) -> bool {
        CapabilitySet::is_feature_enabled(self, name)
    }

    #[inline]
    fn is_extension_enabled(&self, name: &str) -> bool {
        CapabilitySet::is_extension_enabled(self, name)
    }

    #[inline]
    fn device_limit(&self, name: &str) -> u64 {
        CapabilitySet::device_limit(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeDevice;

    impl DeviceCapabilities for FakeDevice {
        fn api_version(&self) -> Version {
            Version::V1_2
        }

        fn is_feature_enabled(&self, name: &str) -> bool {
            name == "multiview"
        }

        fn is_extension_enabled(&self, name: &str) -> bool {
            name == "khr_push_descriptor"
        }

        fn device_limit(&self, name: &str) -> u64 {
            match name {
                "max_color_attachments" => 8,
                _ => 0,
            }
        }
    }

    #[test]
    fn guaranteed_limits() {
        let capabilities = CapabilitySet::new();

        assert_eq!(capabilities.device_limit("max_color_attachments"), 4);
        assert_eq!(capabilities.device_limit("max_uniform_buffer_range"), 16384);
        assert_eq!(capabilities.device_limit("not_a_limit"), 0);

        let capabilities = capabilities.with_limit("max_color_attachments", 8);
        assert_eq!(capabilities.device_limit("max_color_attachments"), 8);
    }

    #[test]
    fn requirements() {
        use crate::RequiresAllOf;

        const MULTIVIEW: RequiresOneOf = RequiresOneOf(&[
            RequiresAllOf(&[Requires::APIVersion(Version::V1_1)]),
            RequiresAllOf(&[Requires::DeviceExtension("khr_multiview")]),
        ]);

        assert!(!CapabilitySet::new().satisfies(MULTIVIEW));
        assert!(CapabilitySet::new()
            .with_extension("khr_multiview")
            .satisfies(MULTIVIEW));
        assert!(CapabilitySet::new()
            .with_api_version(Version::V1_2)
            .satisfies(MULTIVIEW));
    }

    #[test]
    fn snapshot_of_source() {
        let capabilities = CapabilitySet::from_source(
            &FakeDevice,
            &["multiview", "geometry_shader"],
            &["khr_push_descriptor"],
        );

        assert_eq!(capabilities.api_version(), Version::V1_2);
        assert!(capabilities.is_feature_enabled("multiview"));
        assert!(!capabilities.is_feature_enabled("geometry_shader"));
        assert!(capabilities.is_extension_enabled("khr_push_descriptor"));
        assert_eq!(capabilities.device_limit("max_color_attachments"), 8);
        assert_eq!(capabilities.device_limit("max_push_descriptors"), 0);
    }
}
