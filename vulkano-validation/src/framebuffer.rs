// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The image views bound to the attachments of a render pass.
//!
//! A framebuffer is created for one render pass, and must provide one image view for each of its
//! attachments. Each view must match the format and sample count of its attachment description,
//! must have been created with the usage its subpass references need, and must be large enough
//! to cover the area and layers of the framebuffer.
//!
//! An *imageless* framebuffer only describes the views it will be used with. The views
//! themselves are provided when the render pass begins.

use crate::{
    format::Format,
    image::{ImageUsage, ImageView},
    render_pass::RenderPass,
    report::Halt,
    ErrorKind, Id, ObjectGraph, Requires, RequiresAllOf, RequiresOneOf, ValidationError,
    ValidationReport,
};

vulkan_bitflags! {
    #[non_exhaustive]

    /// Flags specifying additional properties of a framebuffer.
    FramebufferCreateFlags = FramebufferCreateFlags(u32);

    /// The framebuffer is created without image views. The views are provided when the render
    /// pass begins, and [`FramebufferCreateInfo::attachment_image_infos`] describes them.
    IMAGELESS = IMAGELESS
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_2)]),
        RequiresAllOf([DeviceExtension(khr_imageless_framebuffer)]),
    ]),
}

/// Parameters to create a new `Framebuffer`.
#[derive(Clone, Debug)]
pub struct FramebufferCreateInfo {
    /// Additional properties of the framebuffer.
    ///
    /// The default value is empty.
    pub flags: FramebufferCreateFlags,

    /// The render pass that the framebuffer is created for.
    ///
    /// The default value is `Id::INVALID`, which must be overridden.
    pub render_pass: Id<RenderPass>,

    /// The image views bound to each attachment of the render pass. Ignored if `flags` contains
    /// [`FramebufferCreateFlags::IMAGELESS`].
    ///
    /// The default value is empty.
    pub attachments: Vec<Id<ImageView>>,

    /// A description of the image views that will be bound to each attachment of the render
    /// pass. Only used if `flags` contains [`FramebufferCreateFlags::IMAGELESS`].
    ///
    /// The default value is empty.
    pub attachment_image_infos: Vec<FramebufferAttachmentImageInfo>,

    /// The width and height of the framebuffer.
    ///
    /// The default value is `[0; 2]`, which must be overridden.
    pub extent: [u32; 2],

    /// The number of layers of the framebuffer.
    ///
    /// The default value is `1`.
    pub layers: u32,

    pub _ne: crate::NonExhaustive,
}

impl Default for FramebufferCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            flags: FramebufferCreateFlags::empty(),
            render_pass: Id::INVALID,
            attachments: Vec::new(),
            attachment_image_infos: Vec::new(),
            extent: [0; 2],
            layers: 1,
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl FramebufferCreateInfo {
    pub(crate) fn validate(
        &self,
        graph: &ObjectGraph,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let &Self {
            flags,
            render_pass,
            ref attachments,
            ref attachment_image_infos,
            extent,
            layers,
            _ne: _,
        } = self;

        let capabilities = graph.capabilities();

        report.check(flags.validate_capabilities(capabilities).map_err(|err| {
            err.add_context("flags")
                .set_vuids(&["VUID-VkFramebufferCreateInfo-flags-parameter"])
        }))?;

        let imageless = flags.intersects(FramebufferCreateFlags::IMAGELESS);

        if imageless && !capabilities.is_feature_enabled("imageless_framebuffer") {
            report.push(Box::new(ValidationError {
                context: "flags".into(),
                problem: "contains `FramebufferCreateFlags::IMAGELESS`".into(),
                requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                    "imageless_framebuffer",
                )])]),
                vuids: &["VUID-VkFramebufferCreateInfo-flags-03189"],
                ..Default::default()
            }))?;
        }

        self.validate_extent(graph, report)?;

        let Some(render_pass) = graph.resolve(render_pass, "render_pass", report)? else {
            return Ok(());
        };

        if render_pass.is_multiview() && layers != 1 {
            report.push(Box::new(ValidationError {
                problem: "`render_pass` uses multiview, but `layers` is not 1".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-renderPass-02531"],
                ..Default::default()
            }))?;
        }

        let attachment_count = render_pass.attachments().len();

        if imageless {
            if attachment_image_infos.len() != attachment_count {
                report.push(Box::new(ValidationError {
                    problem: format!(
                        "`flags` contains `FramebufferCreateFlags::IMAGELESS`, but the length of \
                        `attachment_image_infos` ({}) does not equal the number of attachments \
                        of `render_pass` ({})",
                        attachment_image_infos.len(),
                        attachment_count,
                    )
                    .into(),
                    vuids: &["VUID-VkFramebufferAttachmentsCreateInfo-attachmentImageInfoCount-03191"],
                    kind: ErrorKind::Structural,
                    ..Default::default()
                }))?;

                return Ok(());
            }

            for (index, image_info) in attachment_image_infos.iter().enumerate() {
                report.scope(format!("attachment_image_infos[{}]", index), |report| {
                    image_info.validate(render_pass, index as u32, extent, layers, report)
                })?;
            }
        } else {
            if attachments.len() != attachment_count {
                report.push(Box::new(ValidationError {
                    problem: format!(
                        "the length of `attachments` ({}) does not equal the number of \
                        attachments of `render_pass` ({})",
                        attachments.len(),
                        attachment_count,
                    )
                    .into(),
                    vuids: &["VUID-VkFramebufferCreateInfo-attachmentCount-00876"],
                    kind: ErrorKind::Structural,
                    ..Default::default()
                }))?;

                return Ok(());
            }

            for (index, &image_view) in attachments.iter().enumerate() {
                report.scope(format!("attachments[{}]", index), |report| {
                    let Some(image_view) = graph.resolve(image_view, "", report)? else {
                        return Ok(());
                    };

                    self.validate_attachment(render_pass, index as u32, image_view, report)
                })?;
            }
        }

        Ok(())
    }

    fn validate_extent(
        &self,
        graph: &ObjectGraph,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let capabilities = graph.capabilities();
        let [width, height] = self.extent;
        let layers = self.layers;

        let max_width = capabilities.device_limit("max_framebuffer_width");
        let max_height = capabilities.device_limit("max_framebuffer_height");
        let max_layers = capabilities.device_limit("max_framebuffer_layers");

        if width == 0 {
            report.push(Box::new(ValidationError {
                context: "extent[0]".into(),
                problem: "is zero".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-width-00885"],
                ..Default::default()
            }))?;
        } else if u64::from(width) > max_width {
            report.push(Box::new(ValidationError {
                context: "extent[0]".into(),
                problem: "exceeds the `max_framebuffer_width` limit".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-width-00886"],
                ..Default::default()
            }))?;
        }

        if height == 0 {
            report.push(Box::new(ValidationError {
                context: "extent[1]".into(),
                problem: "is zero".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-height-00887"],
                ..Default::default()
            }))?;
        } else if u64::from(height) > max_height {
            report.push(Box::new(ValidationError {
                context: "extent[1]".into(),
                problem: "exceeds the `max_framebuffer_height` limit".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-height-00888"],
                ..Default::default()
            }))?;
        }

        if layers == 0 {
            report.push(Box::new(ValidationError {
                context: "layers".into(),
                problem: "is zero".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-layers-00889"],
                ..Default::default()
            }))?;
        } else if u64::from(layers) > max_layers {
            report.push(Box::new(ValidationError {
                context: "layers".into(),
                problem: "exceeds the `max_framebuffer_layers` limit".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-layers-00890"],
                ..Default::default()
            }))?;
        }

        Ok(())
    }

    fn validate_attachment(
        &self,
        render_pass: &RenderPass,
        attachment: u32,
        image_view: &ImageView,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let description = &render_pass.attachments()[attachment as usize];

        if image_view.format() != description.format {
            report.push(Box::new(ValidationError {
                problem: format!(
                    "the format of the image view (`{:?}`) does not equal the format of \
                    attachment {} of `render_pass` (`{:?}`)",
                    image_view.format(),
                    attachment,
                    description.format,
                )
                .into(),
                vuids: &["VUID-VkFramebufferCreateInfo-pAttachments-00880"],
                ..Default::default()
            }))?;
        }

        if image_view.samples() != description.samples {
            report.push(Box::new(ValidationError {
                problem: format!(
                    "the sample count of the image view (`{:?}`) does not equal the sample \
                    count of attachment {} of `render_pass` (`{:?}`)",
                    image_view.samples(),
                    attachment,
                    description.samples,
                )
                .into(),
                vuids: &["VUID-VkFramebufferCreateInfo-pAttachments-00881"],
                ..Default::default()
            }))?;
        }

        let required_usage = render_pass.attachment_usage(attachment);
        check_usage(required_usage, image_view.usage(), false, report)?;

        // Size rules only apply to attachments that a subpass actually uses.
        if required_usage.is_empty() {
            return Ok(());
        }

        let [width, height] = self.extent;
        let [view_width, view_height] = image_view.extent();

        if view_width < width {
            report.push(Box::new(ValidationError {
                problem: "the width of the image view is less than `extent[0]`".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-flags-04533"],
                ..Default::default()
            }))?;
        }

        if view_height < height {
            report.push(Box::new(ValidationError {
                problem: "the height of the image view is less than `extent[1]`".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-flags-04534"],
                ..Default::default()
            }))?;
        }

        if render_pass.is_multiview() {
            if image_view.layer_count() < render_pass.view_count() {
                report.push(Box::new(ValidationError {
                    problem: format!(
                        "`render_pass` renders to {} views, but the image view only has {} \
                        layers",
                        render_pass.view_count(),
                        image_view.layer_count(),
                    )
                    .into(),
                    vuids: &["VUID-VkFramebufferCreateInfo-renderPass-04536"],
                    ..Default::default()
                }))?;
            }
        } else if image_view.layer_count() < self.layers {
            report.push(Box::new(ValidationError {
                problem: "the layer count of the image view is less than `layers`".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-flags-04535"],
                ..Default::default()
            }))?;
        }

        Ok(())
    }
}

/// Describes an image view that will be bound to an attachment of an imageless framebuffer.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FramebufferAttachmentImageInfo {
    /// The usage of the image that the view will be created from.
    ///
    /// The default value is empty.
    pub usage: ImageUsage,

    /// The width of the image view.
    ///
    /// The default value is `0`.
    pub width: u32,

    /// The height of the image view.
    ///
    /// The default value is `0`.
    pub height: u32,

    /// The number of layers of the image view.
    ///
    /// The default value is `1`.
    pub layer_count: u32,

    /// The formats the image view may have.
    ///
    /// The default value is empty.
    pub view_formats: Vec<Format>,

    #[cfg_attr(feature = "serde", serde(skip))]
    pub _ne: crate::NonExhaustive,
}

impl Default for FramebufferAttachmentImageInfo {
    #[inline]
    fn default() -> Self {
        Self {
            usage: ImageUsage::empty(),
            width: 0,
            height: 0,
            layer_count: 1,
            view_formats: Vec::new(),
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl FramebufferAttachmentImageInfo {
    fn validate(
        &self,
        render_pass: &RenderPass,
        attachment: u32,
        extent: [u32; 2],
        layers: u32,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let &Self {
            usage,
            width,
            height,
            layer_count,
            ref view_formats,
            _ne: _,
        } = self;

        let description = &render_pass.attachments()[attachment as usize];

        if !view_formats.contains(&description.format) {
            report.push(Box::new(ValidationError {
                context: "view_formats".into(),
                problem: format!(
                    "does not contain the format of attachment {} of `render_pass` (`{:?}`)",
                    attachment, description.format,
                )
                .into(),
                vuids: &["VUID-VkFramebufferCreateInfo-flags-03205"],
                ..Default::default()
            }))?;
        }

        let required_usage = render_pass.attachment_usage(attachment);
        check_usage(required_usage, usage, true, report)?;

        if required_usage.is_empty() {
            return Ok(());
        }

        if width < extent[0] {
            report.push(Box::new(ValidationError {
                context: "width".into(),
                problem: "is less than the width of the framebuffer".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-flags-04541"],
                ..Default::default()
            }))?;
        }

        if height < extent[1] {
            report.push(Box::new(ValidationError {
                context: "height".into(),
                problem: "is less than the height of the framebuffer".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-flags-04542"],
                ..Default::default()
            }))?;
        }

        if render_pass.is_multiview() {
            if layer_count < render_pass.view_count() {
                report.push(Box::new(ValidationError {
                    context: "layer_count".into(),
                    problem: format!(
                        "is less than the number of views that `render_pass` renders to ({})",
                        render_pass.view_count(),
                    )
                    .into(),
                    vuids: &["VUID-VkFramebufferCreateInfo-renderPass-03198"],
                    ..Default::default()
                }))?;
            }
        } else if layer_count < layers {
            report.push(Box::new(ValidationError {
                context: "layer_count".into(),
                problem: "is less than the number of layers of the framebuffer".into(),
                vuids: &["VUID-VkFramebufferCreateInfo-flags-04546"],
                ..Default::default()
            }))?;
        }

        Ok(())
    }
}

/// Checks that `usage` covers the usage the subpass references of an attachment need.
fn check_usage(
    required: ImageUsage,
    usage: ImageUsage,
    imageless: bool,
    report: &mut ValidationReport,
) -> Result<(), Halt> {
    if required.intersects(ImageUsage::COLOR_ATTACHMENT)
        && !usage.intersects(ImageUsage::COLOR_ATTACHMENT)
    {
        report.push(Box::new(ValidationError {
            context: "usage".into(),
            problem: "the attachment is used as a color or resolve attachment, but the usage \
                does not contain `ImageUsage::COLOR_ATTACHMENT`"
                .into(),
            vuids: if imageless {
                &["VUID-VkFramebufferCreateInfo-flags-03201"]
            } else {
                &["VUID-VkFramebufferCreateInfo-pAttachments-00877"]
            },
            ..Default::default()
        }))?;
    }

    if required.intersects(ImageUsage::DEPTH_STENCIL_ATTACHMENT)
        && !usage.intersects(ImageUsage::DEPTH_STENCIL_ATTACHMENT)
    {
        report.push(Box::new(ValidationError {
            context: "usage".into(),
            problem: "the attachment is used as a depth/stencil attachment, but the usage does \
                not contain `ImageUsage::DEPTH_STENCIL_ATTACHMENT`"
                .into(),
            vuids: if imageless {
                &["VUID-VkFramebufferCreateInfo-flags-03202"]
            } else {
                &["VUID-VkFramebufferCreateInfo-pAttachments-02633"]
            },
            ..Default::default()
        }))?;
    }

    if required.intersects(ImageUsage::INPUT_ATTACHMENT)
        && !usage.intersects(ImageUsage::INPUT_ATTACHMENT)
    {
        report.push(Box::new(ValidationError {
            context: "usage".into(),
            problem: "the attachment is used as an input attachment, but the usage does not \
                contain `ImageUsage::INPUT_ATTACHMENT`"
                .into(),
            vuids: if imageless {
                &["VUID-VkFramebufferCreateInfo-flags-03204"]
            } else {
                &["VUID-VkFramebufferCreateInfo-pAttachments-00879"]
            },
            ..Default::default()
        }))?;
    }

    Ok(())
}

/// A framebuffer as recorded in the object graph.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    flags: FramebufferCreateFlags,
    render_pass: Id<RenderPass>,
    attachments: Vec<Id<ImageView>>,
    extent: [u32; 2],
    layers: u32,
}

impl Framebuffer {
    pub(crate) fn new(create_info: FramebufferCreateInfo) -> Self {
        let FramebufferCreateInfo {
            flags,
            render_pass,
            mut attachments,
            attachment_image_infos: _,
            extent,
            layers,
            _ne: _,
        } = create_info;

        if flags.intersects(FramebufferCreateFlags::IMAGELESS) {
            attachments.clear();
        }

        Framebuffer {
            flags,
            render_pass,
            attachments,
            extent,
            layers,
        }
    }

    /// Returns the flags the framebuffer was created with.
    #[inline]
    pub fn flags(&self) -> FramebufferCreateFlags {
        self.flags
    }

    /// Returns the render pass the framebuffer was created for.
    #[inline]
    pub fn render_pass(&self) -> Id<RenderPass> {
        self.render_pass
    }

    /// Returns the image views bound to the attachments. Empty for an imageless framebuffer.
    #[inline]
    pub fn attachments(&self) -> &[Id<ImageView>] {
        &self.attachments
    }

    /// Returns the width and height of the framebuffer.
    #[inline]
    pub fn extent(&self) -> [u32; 2] {
        self.extent
    }

    /// Returns the number of layers of the framebuffer.
    #[inline]
    pub fn layers(&self) -> u32 {
        self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        format::Format,
        image::{ImageCreateInfo, ImageLayout, ImageViewCreateInfo},
        render_pass::{
            AttachmentDescription, AttachmentReference, LoadOp, RenderPassCreateInfo, StoreOp,
            SubpassDescription,
        },
        CapabilitySet, ValidationMode, Version,
    };

    fn color_pass(graph: &mut ObjectGraph, view_mask: u32) -> Id<RenderPass> {
        graph
            .create_render_pass(RenderPassCreateInfo {
                attachments: vec![AttachmentDescription {
                    format: Format::R8G8B8A8_UNORM,
                    load_op: LoadOp::Clear,
                    store_op: StoreOp::Store,
                    final_layout: ImageLayout::ColorAttachmentOptimal,
                    ..Default::default()
                }],
                subpasses: vec![SubpassDescription {
                    view_mask,
                    color_attachments: vec![Some(AttachmentReference {
                        attachment: 0,
                        layout: ImageLayout::ColorAttachmentOptimal,
                        ..Default::default()
                    })],
                    ..Default::default()
                }],
                ..Default::default()
            })
            .unwrap()
    }

    fn image_view(
        graph: &mut ObjectGraph,
        format: Format,
        usage: ImageUsage,
        layers: u32,
    ) -> Id<ImageView> {
        let image = graph
            .create_image(ImageCreateInfo {
                format,
                usage,
                extent: [128, 128, 1],
                array_layers: layers,
                ..Default::default()
            })
            .unwrap();

        graph
            .create_image_view(ImageViewCreateInfo {
                layer_count: layers,
                ..ImageViewCreateInfo::from_image(image)
            })
            .unwrap()
    }

    #[test]
    fn basic() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let render_pass = color_pass(&mut graph, 0);
        let view = image_view(
            &mut graph,
            Format::R8G8B8A8_UNORM,
            ImageUsage::COLOR_ATTACHMENT,
            1,
        );

        let framebuffer = graph
            .create_framebuffer(FramebufferCreateInfo {
                render_pass,
                attachments: vec![view],
                extent: [128, 128],
                ..Default::default()
            })
            .unwrap();

        let framebuffer = graph.get(framebuffer).unwrap();
        assert_eq!(framebuffer.attachments(), [view]);
        assert_eq!(framebuffer.extent(), [128, 128]);
    }

    #[test]
    fn mismatched_attachment() {
        let mut graph =
            ObjectGraph::new(CapabilitySet::new()).with_mode(ValidationMode::CollectAll);
        let render_pass = color_pass(&mut graph, 0);
        let view = image_view(&mut graph, Format::R8G8B8A8_SRGB, ImageUsage::SAMPLED, 1);

        let report = graph
            .create_framebuffer(FramebufferCreateInfo {
                render_pass,
                attachments: vec![view],
                extent: [256, 64],
                layers: 2,
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkFramebufferCreateInfo-pAttachments-00880",
                "VUID-VkFramebufferCreateInfo-pAttachments-00877",
                "VUID-VkFramebufferCreateInfo-flags-04533",
                "VUID-VkFramebufferCreateInfo-flags-04535",
            ],
        );
        assert_eq!(report.errors()[0].context, "create_info.attachments[0]");
    }

    #[test]
    fn extent_limits() {
        let mut graph =
            ObjectGraph::new(CapabilitySet::new()).with_mode(ValidationMode::CollectAll);
        let render_pass = color_pass(&mut graph, 0);

        let report = graph
            .create_framebuffer(FramebufferCreateInfo {
                render_pass,
                extent: [0, 5000],
                layers: 0,
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkFramebufferCreateInfo-width-00885",
                "VUID-VkFramebufferCreateInfo-height-00888",
                "VUID-VkFramebufferCreateInfo-layers-00889",
                "VUID-VkFramebufferCreateInfo-attachmentCount-00876",
            ],
        );
        assert_eq!(report.kinds().last(), Some(ErrorKind::Structural));
    }

    #[test]
    fn multiview_layers() {
        let capabilities = CapabilitySet::new()
            .with_api_version(Version::V1_1)
            .with_feature("multiview");
        let mut graph = ObjectGraph::new(capabilities).with_mode(ValidationMode::CollectAll);
        let render_pass = color_pass(&mut graph, 0b111);
        let view = image_view(
            &mut graph,
            Format::R8G8B8A8_UNORM,
            ImageUsage::COLOR_ATTACHMENT,
            2,
        );

        let report = graph
            .create_framebuffer(FramebufferCreateInfo {
                render_pass,
                attachments: vec![view],
                extent: [128, 128],
                layers: 2,
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkFramebufferCreateInfo-renderPass-02531",
                "VUID-VkFramebufferCreateInfo-renderPass-04536",
            ],
        );
    }

    #[test]
    fn imageless() {
        let mut graph =
            ObjectGraph::new(CapabilitySet::new()).with_mode(ValidationMode::CollectAll);
        let render_pass = color_pass(&mut graph, 0);
        let create_info = FramebufferCreateInfo {
            flags: FramebufferCreateFlags::IMAGELESS,
            render_pass,
            attachment_image_infos: vec![FramebufferAttachmentImageInfo {
                usage: ImageUsage::COLOR_ATTACHMENT,
                width: 64,
                height: 64,
                view_formats: vec![Format::R8G8B8A8_UNORM],
                ..Default::default()
            }],
            extent: [64, 64],
            ..Default::default()
        };

        let report = graph.create_framebuffer(create_info.clone()).unwrap_err();
        assert_eq!(report.kinds().next(), Some(ErrorKind::Capability));

        let mut graph = ObjectGraph::new(
            CapabilitySet::new()
                .with_api_version(Version::V1_2)
                .with_feature("imageless_framebuffer"),
        )
        .with_mode(ValidationMode::CollectAll);
        let render_pass = color_pass(&mut graph, 0);
        let framebuffer = graph
            .create_framebuffer(FramebufferCreateInfo {
                render_pass,
                ..create_info.clone()
            })
            .unwrap();
        assert!(graph.get(framebuffer).unwrap().attachments().is_empty());

        let report = graph
            .create_framebuffer(FramebufferCreateInfo {
                render_pass,
                attachment_image_infos: vec![FramebufferAttachmentImageInfo {
                    usage: ImageUsage::SAMPLED,
                    width: 32,
                    height: 64,
                    view_formats: vec![Format::R8G8B8A8_SRGB],
                    ..Default::default()
                }],
                ..create_info
            })
            .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkFramebufferCreateInfo-flags-03205",
                "VUID-VkFramebufferCreateInfo-flags-03201",
                "VUID-VkFramebufferCreateInfo-flags-04541",
            ],
        );
    }
}
