// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The formats that attachments, images and texel buffers can have.
//!
//! Only the aspects of a format matter to the rules in this crate: whether it holds color, depth,
//! stencil or several planes. The set of formats is therefore limited to representatives of each
//! class.

use crate::image::ImageAspects;

/// The format of an attachment, image or buffer view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(non_camel_case_types)]
#[repr(i32)]
pub enum Format {
    /// No format. Never valid for an attachment or image.
    UNDEFINED = ash::vk::Format::UNDEFINED.as_raw(),
    R8_UNORM = ash::vk::Format::R8_UNORM.as_raw(),
    R8G8_UNORM = ash::vk::Format::R8G8_UNORM.as_raw(),
    R8G8B8A8_UNORM = ash::vk::Format::R8G8B8A8_UNORM.as_raw(),
    R8G8B8A8_SRGB = ash::vk::Format::R8G8B8A8_SRGB.as_raw(),
    B8G8R8A8_UNORM = ash::vk::Format::B8G8R8A8_UNORM.as_raw(),
    B8G8R8A8_SRGB = ash::vk::Format::B8G8R8A8_SRGB.as_raw(),
    A2B10G10R10_UNORM_PACK32 = ash::vk::Format::A2B10G10R10_UNORM_PACK32.as_raw(),
    R16G16B16A16_SFLOAT = ash::vk::Format::R16G16B16A16_SFLOAT.as_raw(),
    R32_UINT = ash::vk::Format::R32_UINT.as_raw(),
    R32_SFLOAT = ash::vk::Format::R32_SFLOAT.as_raw(),
    R32G32B32A32_SFLOAT = ash::vk::Format::R32G32B32A32_SFLOAT.as_raw(),
    D16_UNORM = ash::vk::Format::D16_UNORM.as_raw(),
    X8_D24_UNORM_PACK32 = ash::vk::Format::X8_D24_UNORM_PACK32.as_raw(),
    D32_SFLOAT = ash::vk::Format::D32_SFLOAT.as_raw(),
    S8_UINT = ash::vk::Format::S8_UINT.as_raw(),
    D16_UNORM_S8_UINT = ash::vk::Format::D16_UNORM_S8_UINT.as_raw(),
    D24_UNORM_S8_UINT = ash::vk::Format::D24_UNORM_S8_UINT.as_raw(),
    D32_SFLOAT_S8_UINT = ash::vk::Format::D32_SFLOAT_S8_UINT.as_raw(),
    G8_B8R8_2PLANE_420_UNORM = ash::vk::Format::G8_B8R8_2PLANE_420_UNORM.as_raw(),
    G8_B8_R8_3PLANE_420_UNORM = ash::vk::Format::G8_B8_R8_3PLANE_420_UNORM.as_raw(),
}

impl Format {
    /// Returns the aspects that images of this format have.
    pub fn aspects(self) -> ImageAspects {
        match self {
            Format::UNDEFINED => ImageAspects::empty(),
            Format::D16_UNORM | Format::X8_D24_UNORM_PACK32 | Format::D32_SFLOAT => {
                ImageAspects::DEPTH
            }
            Format::S8_UINT => ImageAspects::STENCIL,
            Format::D16_UNORM_S8_UINT | Format::D24_UNORM_S8_UINT | Format::D32_SFLOAT_S8_UINT => {
                ImageAspects::DEPTH | ImageAspects::STENCIL
            }
            Format::G8_B8R8_2PLANE_420_UNORM => {
                ImageAspects::COLOR | ImageAspects::PLANE_0 | ImageAspects::PLANE_1
            }
            Format::G8_B8_R8_3PLANE_420_UNORM => {
                ImageAspects::COLOR
                    | ImageAspects::PLANE_0
                    | ImageAspects::PLANE_1
                    | ImageAspects::PLANE_2
            }
            _ => ImageAspects::COLOR,
        }
    }

    /// Returns the number of planes of the format. Single-planar formats return 1.
    #[inline]
    pub fn planes(self) -> u32 {
        match self {
            Format::G8_B8R8_2PLANE_420_UNORM => 2,
            Format::G8_B8_R8_3PLANE_420_UNORM => 3,
            _ => 1,
        }
    }

    /// Returns whether the format has a depth aspect, a stencil aspect or both.
    #[inline]
    pub fn is_depth_stencil(self) -> bool {
        self.aspects()
            .intersects(ImageAspects::DEPTH | ImageAspects::STENCIL)
    }

    /// Returns whether the format has a color aspect.
    #[inline]
    pub fn is_color(self) -> bool {
        self.aspects().intersects(ImageAspects::COLOR)
    }
}

impl From<Format> for ash::vk::Format {
    #[inline]
    fn from(val: Format) -> Self {
        ash::vk::Format::from_raw(val as i32)
    }
}

impl TryFrom<ash::vk::Format> for Format {
    type Error = ();

    fn try_from(val: ash::vk::Format) -> Result<Self, Self::Error> {
        Ok(match val {
            ash::vk::Format::UNDEFINED => Self::UNDEFINED,
            ash::vk::Format::R8_UNORM => Self::R8_UNORM,
            ash::vk::Format::R8G8_UNORM => Self::R8G8_UNORM,
            ash::vk::Format::R8G8B8A8_UNORM => Self::R8G8B8A8_UNORM,
            ash::vk::Format::R8G8B8A8_SRGB => Self::R8G8B8A8_SRGB,
            ash::vk::Format::B8G8R8A8_UNORM => Self::B8G8R8A8_UNORM,
            ash::vk::Format::B8G8R8A8_SRGB => Self::B8G8R8A8_SRGB,
            ash::vk::Format::A2B10G10R10_UNORM_PACK32 => Self::A2B10G10R10_UNORM_PACK32,
            ash::vk::Format::R16G16B16A16_SFLOAT => Self::R16G16B16A16_SFLOAT,
            ash::vk::Format::R32_UINT => Self::R32_UINT,
            ash::vk::Format::R32_SFLOAT => Self::R32_SFLOAT,
            ash::vk::Format::R32G32B32A32_SFLOAT => Self::R32G32B32A32_SFLOAT,
            ash::vk::Format::D16_UNORM => Self::D16_UNORM,
            ash::vk::Format::X8_D24_UNORM_PACK32 => Self::X8_D24_UNORM_PACK32,
            ash::vk::Format::D32_SFLOAT => Self::D32_SFLOAT,
            ash::vk::Format::S8_UINT => Self::S8_UINT,
            ash::vk::Format::D16_UNORM_S8_UINT => Self::D16_UNORM_S8_UINT,
            ash::vk::Format::D24_UNORM_S8_UINT => Self::D24_UNORM_S8_UINT,
            ash::vk::Format::D32_SFLOAT_S8_UINT => Self::D32_SFLOAT_S8_UINT,
            ash::vk::Format::G8_B8R8_2PLANE_420_UNORM => Self::G8_B8R8_2PLANE_420_UNORM,
            ash::vk::Format::G8_B8_R8_3PLANE_420_UNORM => Self::G8_B8_R8_3PLANE_420_UNORM,
            _ => return Err(()),
        })
    }
}

impl Default for Format {
    #[inline]
    fn default() -> Self {
        Format::UNDEFINED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspects() {
        assert_eq!(Format::R8G8B8A8_UNORM.aspects(), ImageAspects::COLOR);
        assert_eq!(Format::D32_SFLOAT.aspects(), ImageAspects::DEPTH);
        assert_eq!(
            Format::D24_UNORM_S8_UINT.aspects(),
            ImageAspects::DEPTH | ImageAspects::STENCIL,
        );
        assert!(Format::S8_UINT.is_depth_stencil());
        assert!(!Format::S8_UINT.is_color());
        assert!(Format::UNDEFINED.aspects().is_empty());
        assert_eq!(Format::G8_B8_R8_3PLANE_420_UNORM.planes(), 3);
    }

    #[test]
    fn ash_conversion() {
        let raw: ash::vk::Format = Format::D16_UNORM_S8_UINT.into();
        assert_eq!(raw, ash::vk::Format::D16_UNORM_S8_UINT);
        assert_eq!(Format::try_from(raw), Ok(Format::D16_UNORM_S8_UINT));
        assert_eq!(Format::try_from(ash::vk::Format::BC1_RGB_UNORM_BLOCK), Err(()));
    }
}
