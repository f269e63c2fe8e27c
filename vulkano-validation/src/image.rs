// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Images, image views and the properties attachments share with them.
//!
//! The graph only records what rules need to know about an image: its format, sample count,
//! usage, extent and layer count. An image view records the same properties as seen through the
//! view, so that framebuffers and descriptor writes can be checked against the view alone.

use crate::{
    capabilities::CapabilitySet, format::Format, report::Halt, Id, ValidationError,
    ValidationReport,
};

vulkan_enum! {
    #[non_exhaustive]

    /// In-memory layout of the pixel data of an image.
    ImageLayout
    impl {
        /// Returns whether the layout is one of the depth-only or stencil-only layouts, which need
        /// the `separate_depth_stencil_layouts` feature.
        #[inline]
        pub fn is_separate_depth_stencil(self) -> bool {
            matches!(
                self,
                ImageLayout::DepthAttachmentOptimal
                    | ImageLayout::DepthReadOnlyOptimal
                    | ImageLayout::StencilAttachmentOptimal
                    | ImageLayout::StencilReadOnlyOptimal
            )
        }

        /// Returns whether the layout only concerns the depth aspect.
        #[inline]
        pub fn is_depth_only(self) -> bool {
            matches!(
                self,
                ImageLayout::DepthAttachmentOptimal | ImageLayout::DepthReadOnlyOptimal
            )
        }

        /// Returns whether the layout only concerns the stencil aspect.
        #[inline]
        pub fn is_stencil_only(self) -> bool {
            matches!(
                self,
                ImageLayout::StencilAttachmentOptimal | ImageLayout::StencilReadOnlyOptimal
            )
        }

        /// Returns whether the layout is only usable by depth/stencil images.
        #[inline]
        pub fn is_depth_stencil_specific(self) -> bool {
            matches!(
                self,
                ImageLayout::DepthStencilAttachmentOptimal
                    | ImageLayout::DepthStencilReadOnlyOptimal
                    | ImageLayout::DepthReadOnlyStencilAttachmentOptimal
                    | ImageLayout::DepthAttachmentStencilReadOnlyOptimal
            ) || self.is_separate_depth_stencil()
        }

        /// Returns whether the layout can be used for reads from a shader, such as through a
        /// sampled image or input attachment descriptor.
        #[inline]
        pub fn is_shader_readable(self) -> bool {
            matches!(
                self,
                ImageLayout::General
                    | ImageLayout::ShaderReadOnlyOptimal
                    | ImageLayout::DepthStencilReadOnlyOptimal
                    | ImageLayout::DepthReadOnlyStencilAttachmentOptimal
                    | ImageLayout::DepthAttachmentStencilReadOnlyOptimal
                    | ImageLayout::DepthReadOnlyOptimal
                    | ImageLayout::StencilReadOnlyOptimal
                    | ImageLayout::ReadOnlyOptimal
            )
        }

        /// Returns whether the layout can't hold the contents of an image that is being read.
        #[inline]
        pub fn is_uninitialized(self) -> bool {
            matches!(self, ImageLayout::Undefined | ImageLayout::Preinitialized)
        }
    }
    = ImageLayout(i32);

    /// The layout of the data is unknown, and the image is treated as containing no valid data.
    Undefined = UNDEFINED,

    /// A general-purpose layout that can be used for any operation.
    General = GENERAL,

    /// A layout optimized for use as a color attachment.
    ColorAttachmentOptimal = COLOR_ATTACHMENT_OPTIMAL,

    /// A layout optimized for use as a depth/stencil attachment.
    DepthStencilAttachmentOptimal = DEPTH_STENCIL_ATTACHMENT_OPTIMAL,

    /// A layout optimized for read-only use as a depth/stencil attachment, or for shader reads.
    DepthStencilReadOnlyOptimal = DEPTH_STENCIL_READ_ONLY_OPTIMAL,

    /// A layout optimized for read-only use in shaders.
    ShaderReadOnlyOptimal = SHADER_READ_ONLY_OPTIMAL,

    /// A layout optimized for use as the source of a transfer operation.
    TransferSrcOptimal = TRANSFER_SRC_OPTIMAL,

    /// A layout optimized for use as the destination of a transfer operation.
    TransferDstOptimal = TRANSFER_DST_OPTIMAL,

    /// The layout of data preinitialized by the host.
    Preinitialized = PREINITIALIZED,

    /// Read-only depth aspect, attachment stencil aspect.
    DepthReadOnlyStencilAttachmentOptimal = DEPTH_READ_ONLY_STENCIL_ATTACHMENT_OPTIMAL
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_1)]),
        RequiresAllOf([DeviceExtension(khr_maintenance2)]),
    ]),

    /// Attachment depth aspect, read-only stencil aspect.
    DepthAttachmentStencilReadOnlyOptimal = DEPTH_ATTACHMENT_STENCIL_READ_ONLY_OPTIMAL
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_1)]),
        RequiresAllOf([DeviceExtension(khr_maintenance2)]),
    ]),

    /// A layout for the depth aspect only, optimized for use as an attachment.
    DepthAttachmentOptimal = DEPTH_ATTACHMENT_OPTIMAL
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_2)]),
        RequiresAllOf([DeviceExtension(khr_separate_depth_stencil_layouts)]),
    ]),

    /// A layout for the depth aspect only, optimized for read-only use.
    DepthReadOnlyOptimal = DEPTH_READ_ONLY_OPTIMAL
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_2)]),
        RequiresAllOf([DeviceExtension(khr_separate_depth_stencil_layouts)]),
    ]),

    /// A layout for the stencil aspect only, optimized for use as an attachment.
    StencilAttachmentOptimal = STENCIL_ATTACHMENT_OPTIMAL
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_2)]),
        RequiresAllOf([DeviceExtension(khr_separate_depth_stencil_layouts)]),
    ]),

    /// A layout for the stencil aspect only, optimized for read-only use.
    StencilReadOnlyOptimal = STENCIL_READ_ONLY_OPTIMAL
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_2)]),
        RequiresAllOf([DeviceExtension(khr_separate_depth_stencil_layouts)]),
    ]),

    /// A read-only layout whose meaning depends on how the image is used.
    ReadOnlyOptimal = READ_ONLY_OPTIMAL
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_3)]),
        RequiresAllOf([DeviceExtension(khr_synchronization2)]),
    ]),

    /// An attachment layout whose meaning depends on how the image is used.
    AttachmentOptimal = ATTACHMENT_OPTIMAL
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_3)]),
        RequiresAllOf([DeviceExtension(khr_synchronization2)]),
    ]),

    /// The layout of swapchain images that are going to be presented.
    PresentSrc = PRESENT_SRC_KHR
    RequiresOneOf([
        RequiresAllOf([DeviceExtension(khr_swapchain)]),
    ]),
}

impl Default for ImageLayout {
    #[inline]
    fn default() -> Self {
        ImageLayout::Undefined
    }
}

vulkan_bitflags_enum! {
    #[non_exhaustive]

    /// A set of [`ImageAspect`] values.
    ImageAspects,

    /// An individual data type within an image.
    ImageAspect,

    = ImageAspectFlags(u32);

    /// The single aspect of images with a color format.
    COLOR, Color = COLOR,

    /// The depth aspect of images with a depth or depth/stencil format.
    DEPTH, Depth = DEPTH,

    /// The stencil aspect of images with a stencil or depth/stencil format.
    STENCIL, Stencil = STENCIL,

    /// An aspect used with sparse memory. Never valid for attachments or views.
    METADATA, Metadata = METADATA,

    /// The first plane of a multi-planar format.
    PLANE_0, Plane0 = PLANE_0
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_1)]),
        RequiresAllOf([DeviceExtension(khr_sampler_ycbcr_conversion)]),
    ]),

    /// The second plane of a multi-planar format.
    PLANE_1, Plane1 = PLANE_1
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_1)]),
        RequiresAllOf([DeviceExtension(khr_sampler_ycbcr_conversion)]),
    ]),

    /// The third plane of a multi-planar format.
    PLANE_2, Plane2 = PLANE_2
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_1)]),
        RequiresAllOf([DeviceExtension(khr_sampler_ycbcr_conversion)]),
    ]),
}

vulkan_bitflags_enum! {
    #[non_exhaustive]

    /// A set of [`SampleCount`] values.
    SampleCounts,

    /// The number of samples per texel of an image.
    SampleCount,

    = SampleCountFlags(u32);

    /// 1 sample per texel.
    SAMPLE_1, Sample1 = TYPE_1,

    /// 2 samples per texel.
    SAMPLE_2, Sample2 = TYPE_2,

    /// 4 samples per texel.
    SAMPLE_4, Sample4 = TYPE_4,

    /// 8 samples per texel.
    SAMPLE_8, Sample8 = TYPE_8,

    /// 16 samples per texel.
    SAMPLE_16, Sample16 = TYPE_16,

    /// 32 samples per texel.
    SAMPLE_32, Sample32 = TYPE_32,

    /// 64 samples per texel.
    SAMPLE_64, Sample64 = TYPE_64,
}

impl Default for SampleCount {
    #[inline]
    fn default() -> Self {
        SampleCount::Sample1
    }
}

vulkan_bitflags! {
    /// Describes how an image is going to be used.
    ImageUsage = ImageUsageFlags(u32);

    /// The image can be used as a source for transfer operations.
    TRANSFER_SRC = TRANSFER_SRC,

    /// The image can be used as a destination for transfer operations.
    TRANSFER_DST = TRANSFER_DST,

    /// The image can be used as a sampled image in a shader.
    SAMPLED = SAMPLED,

    /// The image can be used as a storage image in a shader.
    STORAGE = STORAGE,

    /// The image can be used as a color attachment in a render pass.
    COLOR_ATTACHMENT = COLOR_ATTACHMENT,

    /// The image can be used as a depth/stencil attachment in a render pass.
    DEPTH_STENCIL_ATTACHMENT = DEPTH_STENCIL_ATTACHMENT,

    /// The image will only be used as a transient attachment.
    TRANSIENT_ATTACHMENT = TRANSIENT_ATTACHMENT,

    /// The image can be used as an input attachment in a render pass.
    INPUT_ATTACHMENT = INPUT_ATTACHMENT,
}

/// Parameters to create a new `Image`.
#[derive(Clone, Debug)]
pub struct ImageCreateInfo {
    /// The format of the image.
    ///
    /// The default value is `Format::UNDEFINED`, which must be overridden.
    pub format: Format,

    /// The number of samples per texel.
    ///
    /// The default value is `SampleCount::Sample1`.
    pub samples: SampleCount,

    /// How the image is going to be used.
    ///
    /// The default value is empty, which must be overridden.
    pub usage: ImageUsage,

    /// The width, height and depth of the image.
    ///
    /// The default value is `[0; 3]`, which must be overridden.
    pub extent: [u32; 3],

    /// The number of array layers.
    ///
    /// The default value is `1`.
    pub array_layers: u32,

    /// The number of mip levels.
    ///
    /// The default value is `1`.
    pub mip_levels: u32,

    pub _ne: crate::NonExhaustive,
}

impl Default for ImageCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            format: Format::UNDEFINED,
            samples: SampleCount::Sample1,
            usage: ImageUsage::empty(),
            extent: [0; 3],
            array_layers: 1,
            mip_levels: 1,
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl ImageCreateInfo {
    pub(crate) fn validate(
        &self,
        capabilities: &CapabilitySet,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let &Self {
            format,
            samples,
            usage,
            extent,
            array_layers,
            mip_levels,
            _ne: _,
        } = self;

        if format == Format::UNDEFINED {
            report.push(Box::new(ValidationError {
                context: "format".into(),
                problem: "is `Format::UNDEFINED`".into(),
                vuids: &["VUID-VkImageCreateInfo-pNext-01975"],
                ..Default::default()
            }))?;
        }

        report.check(
            samples
                .validate_capabilities(capabilities)
                .map_err(|err| err.add_context("samples")),
        )?;

        if usage.is_empty() {
            report.push(Box::new(ValidationError {
                context: "usage".into(),
                problem: "is empty".into(),
                vuids: &["VUID-VkImageCreateInfo-usage-requiredbitmask"],
                kind: crate::ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        if usage.intersects(ImageUsage::TRANSIENT_ATTACHMENT)
            && !(usage
                - (ImageUsage::TRANSIENT_ATTACHMENT
                    | ImageUsage::COLOR_ATTACHMENT
                    | ImageUsage::DEPTH_STENCIL_ATTACHMENT
                    | ImageUsage::INPUT_ATTACHMENT))
                .is_empty()
        {
            report.push(Box::new(ValidationError {
                context: "usage".into(),
                problem: "contains `ImageUsage::TRANSIENT_ATTACHMENT`, but also contains usages \
                    other than attachment usages"
                    .into(),
                vuids: &["VUID-VkImageCreateInfo-usage-00963"],
                ..Default::default()
            }))?;
        }

        const EXTENT_VUIDS: [&[&str]; 3] = [
            &["VUID-VkImageCreateInfo-extent-00944"],
            &["VUID-VkImageCreateInfo-extent-00945"],
            &["VUID-VkImageCreateInfo-extent-00946"],
        ];

        for (index, (&value, vuids)) in extent.iter().zip(EXTENT_VUIDS).enumerate() {
            if value == 0 {
                report.push(Box::new(ValidationError {
                    context: format!("extent[{}]", index).into(),
                    problem: "is zero".into(),
                    vuids,
                    kind: crate::ErrorKind::Structural,
                    ..Default::default()
                }))?;
            }
        }

        if array_layers == 0 {
            report.push(Box::new(ValidationError {
                context: "array_layers".into(),
                problem: "is zero".into(),
                vuids: &["VUID-VkImageCreateInfo-arrayLayers-00948"],
                kind: crate::ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        if mip_levels == 0 {
            report.push(Box::new(ValidationError {
                context: "mip_levels".into(),
                problem: "is zero".into(),
                vuids: &["VUID-VkImageCreateInfo-mipLevels-00947"],
                kind: crate::ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        Ok(())
    }
}

/// The properties of an image as recorded in the object graph.
#[derive(Clone, Debug)]
pub struct Image {
    format: Format,
    samples: SampleCount,
    usage: ImageUsage,
    extent: [u32; 3],
    array_layers: u32,
}

impl Image {
    pub(crate) fn new(create_info: &ImageCreateInfo) -> Self {
        Image {
            format: create_info.format,
            samples: create_info.samples,
            usage: create_info.usage,
            extent: create_info.extent,
            array_layers: create_info.array_layers,
        }
    }

    /// Returns the format of the image.
    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the number of samples per texel.
    #[inline]
    pub fn samples(&self) -> SampleCount {
        self.samples
    }

    /// Returns the usage the image was created with.
    #[inline]
    pub fn usage(&self) -> ImageUsage {
        self.usage
    }

    /// Returns the extent of the image.
    #[inline]
    pub fn extent(&self) -> [u32; 3] {
        self.extent
    }

    /// Returns the number of array layers.
    #[inline]
    pub fn array_layers(&self) -> u32 {
        self.array_layers
    }
}

/// Parameters to create a new `ImageView`.
#[derive(Clone, Debug)]
pub struct ImageViewCreateInfo {
    /// The image to create a view of.
    ///
    /// The default value is `Id::INVALID`, which must be overridden.
    pub image: Id<Image>,

    /// The format of the view. It must equal the format of the image.
    ///
    /// The default value is `None`, which means the format of the image.
    pub format: Option<Format>,

    /// The aspects of the image that the view covers.
    ///
    /// The default value is empty, which means all aspects of the format.
    pub aspects: ImageAspects,

    /// The first array layer of the image that the view covers.
    ///
    /// The default value is `0`.
    pub base_array_layer: u32,

    /// The number of array layers that the view covers.
    ///
    /// The default value is `1`.
    pub layer_count: u32,

    pub _ne: crate::NonExhaustive,
}

impl Default for ImageViewCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            image: Id::INVALID,
            format: None,
            aspects: ImageAspects::empty(),
            base_array_layer: 0,
            layer_count: 1,
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl ImageViewCreateInfo {
    /// Creates an `ImageViewCreateInfo` covering the first layer of `image`.
    #[inline]
    pub fn from_image(image: Id<Image>) -> Self {
        Self {
            image,
            ..Default::default()
        }
    }

    pub(crate) fn validate(
        &self,
        capabilities: &CapabilitySet,
        image: &Image,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let &Self {
            image: _,
            format,
            aspects,
            base_array_layer,
            layer_count,
            _ne: _,
        } = self;

        if let Some(format) = format {
            if format != image.format {
                report.push(Box::new(ValidationError {
                    problem: "`format` does not equal the format of `image`".into(),
                    vuids: &["VUID-VkImageViewCreateInfo-image-01762"],
                    ..Default::default()
                }))?;
            }
        }

        report.check(
            aspects
                .validate_capabilities(capabilities)
                .map_err(|err| err.add_context("aspects")),
        )?;

        if !image.format.aspects().contains(aspects) || aspects.intersects(ImageAspects::METADATA)
        {
            report.push(Box::new(ValidationError {
                context: "aspects".into(),
                problem: "contains aspects that the format of `image` does not have".into(),
                vuids: &["VUID-VkImageViewCreateInfo-subresourceRange-09594"],
                ..Default::default()
            }))?;
        }

        if layer_count == 0 {
            report.push(Box::new(ValidationError {
                context: "layer_count".into(),
                problem: "is zero".into(),
                vuids: &["VUID-VkImageSubresourceRange-layerCount-01721"],
                kind: crate::ErrorKind::Structural,
                ..Default::default()
            }))?;
        } else if base_array_layer >= image.array_layers
            || layer_count > image.array_layers - base_array_layer
        {
            report.push(Box::new(ValidationError {
                problem: "`base_array_layer + layer_count` is greater than the number of array \
                    layers of `image`"
                    .into(),
                vuids: &[
                    "VUID-VkImageViewCreateInfo-subresourceRange-01480",
                    "VUID-VkImageViewCreateInfo-subresourceRange-01483",
                ],
                ..Default::default()
            }))?;
        }

        Ok(())
    }
}

/// The properties of an image view as recorded in the object graph.
#[derive(Clone, Debug)]
pub struct ImageView {
    image: Id<Image>,
    format: Format,
    samples: SampleCount,
    usage: ImageUsage,
    aspects: ImageAspects,
    extent: [u32; 2],
    layer_count: u32,
}

impl ImageView {
    pub(crate) fn new(create_info: &ImageViewCreateInfo, image: &Image) -> Self {
        let format = create_info.format.unwrap_or(image.format);
        let aspects = if create_info.aspects.is_empty() {
            format.aspects()
        } else {
            create_info.aspects
        };

        ImageView {
            image: create_info.image,
            format,
            samples: image.samples,
            usage: image.usage,
            aspects,
            extent: [image.extent[0], image.extent[1]],
            layer_count: create_info.layer_count,
        }
    }

    /// Returns the image the view was created from.
    #[inline]
    pub fn image(&self) -> Id<Image> {
        self.image
    }

    /// Returns the format of the view.
    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the number of samples per texel of the image.
    #[inline]
    pub fn samples(&self) -> SampleCount {
        self.samples
    }

    /// Returns the usage of the image.
    #[inline]
    pub fn usage(&self) -> ImageUsage {
        self.usage
    }

    /// Returns the aspects covered by the view.
    #[inline]
    pub fn aspects(&self) -> ImageAspects {
        self.aspects
    }

    /// Returns the width and height of the view.
    #[inline]
    pub fn extent(&self) -> [u32; 2] {
        self.extent
    }

    /// Returns the number of array layers covered by the view.
    #[inline]
    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ValidationMode, ValidationReport};

    #[test]
    fn layout_capabilities() {
        let capabilities = CapabilitySet::new();

        assert!(ImageLayout::General
            .validate_capabilities(&capabilities)
            .is_ok());

        let err = ImageLayout::DepthAttachmentOptimal
            .validate_capabilities(&capabilities)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Capability);
        assert_eq!(err.requires_one_of.len(), 2);

        let capabilities = capabilities.with_api_version(crate::Version::V1_2);
        assert!(ImageLayout::DepthAttachmentOptimal
            .validate_capabilities(&capabilities)
            .is_ok());
    }

    #[test]
    fn sample_counts() {
        let counts: SampleCounts = [SampleCount::Sample1, SampleCount::Sample4]
            .into_iter()
            .collect();

        assert!(counts.contains_enum(SampleCount::Sample4));
        assert!(!counts.contains_enum(SampleCount::Sample2));
        assert_eq!(
            counts.into_iter().collect::<Vec<_>>(),
            [SampleCount::Sample1, SampleCount::Sample4],
        );
        assert_eq!(format!("{:?}", counts), "SAMPLE_1 | SAMPLE_4");
    }

    #[test]
    fn image_create_info() {
        let capabilities = CapabilitySet::new();
        let create_info = ImageCreateInfo {
            format: Format::R8G8B8A8_UNORM,
            usage: ImageUsage::COLOR_ATTACHMENT | ImageUsage::SAMPLED,
            extent: [64, 64, 1],
            ..Default::default()
        };

        assert!(ValidationReport::run(ValidationMode::CollectAll, |report| {
            create_info.validate(&capabilities, report)
        })
        .is_ok());

        let report = ValidationReport::run(ValidationMode::CollectAll, |report| {
            ImageCreateInfo::default().validate(&capabilities, report)
        })
        .unwrap_err();

        assert!(report.contains("VUID-VkImageCreateInfo-pNext-01975"));
        assert!(report.contains("VUID-VkImageCreateInfo-usage-requiredbitmask"));
        assert!(report.contains("VUID-VkImageCreateInfo-extent-00944"));
        assert!(report.contains("VUID-VkImageCreateInfo-extent-00946"));
    }

    #[test]
    fn view_layers_out_of_range() {
        let capabilities = CapabilitySet::new();
        let image = Image::new(&ImageCreateInfo {
            format: Format::D24_UNORM_S8_UINT,
            usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT,
            extent: [64, 64, 1],
            array_layers: 2,
            ..Default::default()
        });

        let report = ValidationReport::run(ValidationMode::CollectAll, |report| {
            ImageViewCreateInfo {
                aspects: ImageAspects::COLOR,
                base_array_layer: 1,
                layer_count: 2,
                ..Default::default()
            }
            .validate(&capabilities, &image, report)
        })
        .unwrap_err();

        assert!(report.contains("VUID-VkImageViewCreateInfo-subresourceRange-09594"));
        assert!(report.contains("VUID-VkImageViewCreateInfo-subresourceRange-01480"));

        let view = ImageView::new(&ImageViewCreateInfo::default(), &image);
        assert_eq!(view.aspects(), ImageAspects::DEPTH | ImageAspects::STENCIL);
    }
}
