// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Samplers.
//!
//! A sampler can be written to a descriptor set, or baked into a descriptor set layout as an
//! immutable sampler. Only the settings that have creation rules of their own are recorded.

use crate::{
    capabilities::CapabilitySet, report::Halt, Requires, RequiresAllOf, RequiresOneOf,
    ValidationError, ValidationReport,
};

vulkan_enum! {
    /// Describes how the color of each pixel should be determined.
    Filter = Filter(i32);

    /// The pixel whose center is nearest to the requested coordinates is taken from the source
    /// and its value is returned as-is.
    Nearest = NEAREST,

    /// The 8/4/2 pixels (depending on view dimensionality) whose center surround the requested
    /// coordinates are taken, then their values are combined according to the chosen algorithm.
    Linear = LINEAR,
}

vulkan_enum! {
    /// Describes which mipmap from the source to use.
    SamplerMipmapMode = SamplerMipmapMode(i32);

    /// Use the mipmap whose dimensions are the nearest to the dimensions of the destination.
    Nearest = NEAREST,

    /// Take the mipmap whose dimensions are no greater than that of the destination together
    /// with the next higher level mipmap, and combine them.
    Linear = LINEAR,
}

vulkan_enum! {
    #[non_exhaustive]

    /// How the sampler should behave when it needs to access a pixel that is out of range of the
    /// texture.
    SamplerAddressMode = SamplerAddressMode(i32);

    /// Repeat the texture.
    Repeat = REPEAT,

    /// Repeat the texture, flipping it every other time.
    MirroredRepeat = MIRRORED_REPEAT,

    /// Take the closest pixel at the edge of the texture.
    ClampToEdge = CLAMP_TO_EDGE,

    /// Return the border color.
    ClampToBorder = CLAMP_TO_BORDER,

    /// Mirror once, then clamp to the edge.
    MirrorClampToEdge = MIRROR_CLAMP_TO_EDGE
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_2), DeviceFeature(sampler_mirror_clamp_to_edge)]),
        RequiresAllOf([DeviceExtension(khr_sampler_mirror_clamp_to_edge)]),
    ]),
}

/// Parameters to create a new `Sampler`.
#[derive(Clone, Debug)]
pub struct SamplerCreateInfo {
    /// How the sampled value of a single mipmap should be calculated, when magnification is
    /// applied.
    ///
    /// The default value is [`Filter::Nearest`].
    pub mag_filter: Filter,

    /// How the sampled value of a single mipmap should be calculated, when minification is
    /// applied.
    ///
    /// The default value is [`Filter::Nearest`].
    pub min_filter: Filter,

    /// How the final sampled value should be calculated from the samples of individual mipmaps.
    ///
    /// The default value is [`SamplerMipmapMode::Nearest`].
    pub mipmap_mode: SamplerMipmapMode,

    /// How out-of-range texture coordinates should be treated, for the `u`, `v` and `w`
    /// dimensions.
    ///
    /// The default value is [`SamplerAddressMode::ClampToEdge`] for all three.
    pub address_mode: [SamplerAddressMode; 3],

    /// Whether anisotropic texel filtering is enabled, and the maximum anisotropy value to use.
    ///
    /// The default value is `None`.
    pub anisotropy: Option<f32>,

    /// Whether texture coordinates are given in texels rather than normalized to `0.0..1.0`.
    ///
    /// The default value is `false`.
    pub unnormalized_coordinates: bool,

    pub _ne: crate::NonExhaustive,
}

impl Default for SamplerCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            mag_filter: Filter::Nearest,
            min_filter: Filter::Nearest,
            mipmap_mode: SamplerMipmapMode::Nearest,
            address_mode: [SamplerAddressMode::ClampToEdge; 3],
            anisotropy: None,
            unnormalized_coordinates: false,
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl SamplerCreateInfo {
    pub(crate) fn validate(
        &self,
        capabilities: &CapabilitySet,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let &Self {
            mag_filter,
            min_filter,
            mipmap_mode,
            address_mode,
            anisotropy,
            unnormalized_coordinates,
            _ne: _,
        } = self;

        for (index, mode) in address_mode.into_iter().enumerate() {
            report.check(mode.validate_capabilities(capabilities).map_err(|err| {
                err.add_context(format!("address_mode[{}]", index))
                    .set_vuids(&["VUID-VkSamplerCreateInfo-addressModeU-01079"])
            }))?;
        }

        if anisotropy.is_some() && !capabilities.is_feature_enabled("sampler_anisotropy") {
            report.push(Box::new(ValidationError {
                context: "anisotropy".into(),
                problem: "is `Some`".into(),
                requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                    "sampler_anisotropy",
                )])]),
                vuids: &["VUID-VkSamplerCreateInfo-anisotropyEnable-01070"],
                ..Default::default()
            }))?;
        }

        if unnormalized_coordinates {
            if min_filter != mag_filter {
                report.push(Box::new(ValidationError {
                    problem: "`unnormalized_coordinates` is `true`, but `min_filter` and \
                        `mag_filter` are not equal"
                        .into(),
                    vuids: &["VUID-VkSamplerCreateInfo-unnormalizedCoordinates-01072"],
                    ..Default::default()
                }))?;
            }

            if mipmap_mode != SamplerMipmapMode::Nearest {
                report.push(Box::new(ValidationError {
                    problem: "`unnormalized_coordinates` is `true`, but `mipmap_mode` is not \
                        `SamplerMipmapMode::Nearest`"
                        .into(),
                    vuids: &["VUID-VkSamplerCreateInfo-unnormalizedCoordinates-01073"],
                    ..Default::default()
                }))?;
            }

            if address_mode[..2].iter().any(|&mode| {
                !matches!(
                    mode,
                    SamplerAddressMode::ClampToEdge | SamplerAddressMode::ClampToBorder
                )
            }) {
                report.push(Box::new(ValidationError {
                    problem: "`unnormalized_coordinates` is `true`, but `address_mode[0]` or \
                        `address_mode[1]` is not `SamplerAddressMode::ClampToEdge` or \
                        `SamplerAddressMode::ClampToBorder`"
                        .into(),
                    vuids: &["VUID-VkSamplerCreateInfo-unnormalizedCoordinates-01075"],
                    ..Default::default()
                }))?;
            }

            if anisotropy.is_some() {
                report.push(Box::new(ValidationError {
                    problem: "`unnormalized_coordinates` is `true`, but `anisotropy` is `Some`"
                        .into(),
                    vuids: &["VUID-VkSamplerCreateInfo-unnormalizedCoordinates-01076"],
                    ..Default::default()
                }))?;
            }
        }

        Ok(())
    }
}

/// The properties of a sampler as recorded in the object graph.
#[derive(Clone, Debug)]
pub struct Sampler {
    unnormalized_coordinates: bool,
}

impl Sampler {
    pub(crate) fn new(create_info: &SamplerCreateInfo) -> Self {
        Sampler {
            unnormalized_coordinates: create_info.unnormalized_coordinates,
        }
    }

    /// Returns whether the sampler uses unnormalized texture coordinates.
    #[inline]
    pub fn unnormalized_coordinates(&self) -> bool {
        self.unnormalized_coordinates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, ValidationMode};

    #[test]
    fn mirror_clamp_needs_capability() {
        let create_info = SamplerCreateInfo {
            address_mode: [SamplerAddressMode::MirrorClampToEdge; 3],
            ..Default::default()
        };

        let report = ValidationReport::run(ValidationMode::FailFast, |report| {
            create_info.validate(&CapabilitySet::new(), report)
        })
        .unwrap_err();
        assert_eq!(report.first().unwrap().kind(), ErrorKind::Capability);
        assert_eq!(report.first().unwrap().context, "address_mode[0]");

        let capabilities = CapabilitySet::new().with_extension("khr_sampler_mirror_clamp_to_edge");
        assert!(ValidationReport::run(ValidationMode::FailFast, |report| {
            create_info.validate(&capabilities, report)
        })
        .is_ok());
    }

    #[test]
    fn unnormalized_coordinates() {
        let capabilities = CapabilitySet::new().with_feature("sampler_anisotropy");

        let report = ValidationReport::run(ValidationMode::CollectAll, |report| {
            SamplerCreateInfo {
                mag_filter: Filter::Linear,
                address_mode: [SamplerAddressMode::Repeat; 3],
                anisotropy: Some(4.0),
                unnormalized_coordinates: true,
                ..Default::default()
            }
            .validate(&capabilities, report)
        })
        .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkSamplerCreateInfo-unnormalizedCoordinates-01072",
                "VUID-VkSamplerCreateInfo-unnormalizedCoordinates-01075",
                "VUID-VkSamplerCreateInfo-unnormalizedCoordinates-01076",
            ],
        );
    }
}
