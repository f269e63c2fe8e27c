// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Description of the steps of the rendering process, and the images used as input or output.
//!
//! # Render passes and subpasses
//!
//! There are two concepts in Vulkan:
//!
//! - A *render pass* describes the overall process of drawing a frame. It is subdivided into one
//!   or more subpasses.
//! - A *framebuffer* contains the list of image views that are attached during the drawing of
//!   each subpass.
//!
//! Render passes are typically created at initialization only (for example during a loading
//! screen) because they can be costly, while framebuffers can be created and destroyed either at
//! initialization or during the frame.
//!
//! # Formats
//!
//! A render pass can be described in two formats, mirroring `VkRenderPassCreateInfo` and
//! `VkRenderPassCreateInfo2`. Both are lifted into the one [`RenderPassCreateInfo`] of this
//! module, and the rules are written once against it. The [`legacy`] module holds the two plain
//! data formats and their adapters. Rules that have a different VUID in each format report the
//! one of the format the description came from.

pub use self::{
    attachment::{AttachmentRules, AttachmentUsage},
    subpass::{EdgeState, SubpassGraphValidator},
};
use crate::{
    capabilities::CapabilitySet,
    format::Format,
    image::{ImageAspects, ImageLayout, ImageUsage, SampleCount},
    report::Halt,
    sync::{AccessFlags, DependencyFlags, PipelineStages},
    ErrorKind, ValidationError, ValidationReport,
};

/// Picks the VUIDs of the format a render pass description came from.
macro_rules! flavored {
    ($flavor:expr, [$($v1:literal),+ $(,)?], [$($v2:literal),+ $(,)?] $(,)?) => {
        match $flavor {
            crate::render_pass::Flavor::V1 => {
                let vuids: &'static [&'static str] = &[$($v1),+];
                vuids
            }
            crate::render_pass::Flavor::V2 => {
                let vuids: &'static [&'static str] = &[$($v2),+];
                vuids
            }
        }
    };
}

mod attachment;
pub mod legacy;
mod subpass;

/// Special value for an attachment index, meaning the reference is unused.
pub const ATTACHMENT_UNUSED: u32 = ash::vk::ATTACHMENT_UNUSED;

/// Special value for a subpass index, meaning the dependency is with commands outside the render
/// pass.
pub const SUBPASS_EXTERNAL: u32 = ash::vk::SUBPASS_EXTERNAL;

/// The description format a render pass was created from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// `VkRenderPassCreateInfo`.
    V1,
    /// `VkRenderPassCreateInfo2`.
    #[default]
    V2,
}

vulkan_enum! {
    /// Describes what the implementation should do with an attachment at the start of the
    /// subpass that first uses it.
    LoadOp = AttachmentLoadOp(i32);

    /// The content of the attachment will be loaded from memory.
    Load = LOAD,

    /// The content of the attachment will be filled by the implementation with a uniform value
    /// provided when the render pass begins.
    Clear = CLEAR,

    /// The attachment will have undefined content.
    DontCare = DONT_CARE,
}

impl Default for LoadOp {
    #[inline]
    fn default() -> Self {
        LoadOp::DontCare
    }
}

vulkan_enum! {
    #[non_exhaustive]

    /// Describes what the implementation should do with an attachment at the end of the subpass
    /// that last uses it.
    StoreOp = AttachmentStoreOp(i32);

    /// The attachment will be stored.
    Store = STORE,

    /// The content of the attachment becomes undefined.
    DontCare = DONT_CARE,

    /// The attachment is not written, and its content is left untouched.
    None = NONE
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_3)]),
        RequiresAllOf([DeviceExtension(khr_dynamic_rendering)]),
        RequiresAllOf([DeviceExtension(ext_load_store_op_none)]),
    ]),
}

impl Default for StoreOp {
    #[inline]
    fn default() -> Self {
        StoreOp::DontCare
    }
}

vulkan_enum! {
    /// The kind of pipeline that a subpass is used with.
    PipelineBindPoint = PipelineBindPoint(i32);

    /// A compute pipeline.
    Compute = COMPUTE,

    /// A graphics pipeline.
    Graphics = GRAPHICS,
}

impl Default for PipelineBindPoint {
    #[inline]
    fn default() -> Self {
        PipelineBindPoint::Graphics
    }
}

/// Parameters to create a new `RenderPass`.
#[derive(Clone, Debug)]
pub struct RenderPassCreateInfo {
    /// The attachments available for the render pass.
    ///
    /// The default value is empty.
    pub attachments: Vec<AttachmentDescription>,

    /// The subpasses that make up this render pass.
    ///
    /// A render pass must contain at least one subpass.
    ///
    /// The default value is empty, which must be overridden.
    pub subpasses: Vec<SubpassDescription>,

    /// The dependencies between subpasses.
    ///
    /// The default value is empty.
    pub dependencies: Vec<SubpassDependency>,

    /// If multiview rendering is being used (the subpasses have a nonzero `view_mask`), this
    /// specifies sets of views that may be more efficient to render concurrently. Each view bit
    /// must appear in at most one element of the list.
    ///
    /// If multiview rendering is not being used, the value must be empty.
    ///
    /// The default value is empty.
    pub correlated_view_masks: Vec<u32>,

    pub _ne: crate::NonExhaustive,
}

impl Default for RenderPassCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            attachments: Vec::new(),
            subpasses: Vec::new(),
            dependencies: Vec::new(),
            correlated_view_masks: Vec::new(),
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl RenderPassCreateInfo {
    /// Runs every render pass rule, and returns the final state of each dependency.
    pub(crate) fn validate(
        &self,
        capabilities: &CapabilitySet,
        flavor: Flavor,
        report: &mut ValidationReport,
    ) -> Result<Vec<EdgeState>, Halt> {
        if self.subpasses.is_empty() {
            report.push(Box::new(ValidationError {
                context: "subpasses".into(),
                problem: "is empty".into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkRenderPassCreateInfo-subpassCount-arraylength"],
                    ["VUID-VkRenderPassCreateInfo2-subpassCount-arraylength"],
                ),
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        let attachment_rules = AttachmentRules::new(capabilities).with_flavor(flavor);

        for (index, attachment) in self.attachments.iter().enumerate() {
            report.scope(format!("attachments[{}]", index), |report| {
                attachment_rules.check_description(attachment, report)
            })?;
        }

        for index in 0..self.subpasses.len() {
            report.scope(format!("subpasses[{}]", index), |report| {
                attachment_rules.check_subpass(self, index, report)
            })?;
        }

        let mut validator = SubpassGraphValidator::new(capabilities, self).with_flavor(flavor);

        for index in 0..self.dependencies.len() {
            report.scope(format!("dependencies[{}]", index), |report| {
                validator.check_dependency(index, report)
            })?;
        }

        validator.check_multiview(report)?;
        validator.check_input_attachment_ordering(report)?;

        Ok(validator.into_edge_states())
    }

    /// Returns the index of the first subpass that uses `attachment` in any way other than
    /// preserving it.
    pub(crate) fn first_use(&self, attachment: u32) -> Option<usize> {
        self.subpasses
            .iter()
            .position(|subpass| subpass.uses_attachment(attachment))
    }
}

/// Describes an attachment that will be used in a render pass.
#[derive(Clone, Copy, Debug)]
pub struct AttachmentDescription {
    /// The format of the image that is going to be bound.
    ///
    /// The default value is `Format::UNDEFINED`, which must be overridden.
    pub format: Format,

    /// The number of samples of the image that is going to be bound.
    ///
    /// The default value is [`SampleCount::Sample1`].
    pub samples: SampleCount,

    /// What the implementation should do with the attachment at the start of the subpass that
    /// first uses it.
    ///
    /// The default value is [`LoadOp::DontCare`].
    pub load_op: LoadOp,

    /// What the implementation should do with the attachment at the end of the subpass that last
    /// uses it.
    ///
    /// The default value is [`StoreOp::DontCare`].
    pub store_op: StoreOp,

    /// The equivalent of `load_op` for the stencil component of the attachment, if any.
    /// Irrelevant if there is no stencil component.
    ///
    /// The default value is [`LoadOp::DontCare`].
    pub stencil_load_op: LoadOp,

    /// The equivalent of `store_op` for the stencil component of the attachment, if any.
    /// Irrelevant if there is no stencil component.
    ///
    /// The default value is [`StoreOp::DontCare`].
    pub stencil_store_op: StoreOp,

    /// The layout that the image must be in at the start of the render pass.
    ///
    /// The default value is [`ImageLayout::Undefined`].
    pub initial_layout: ImageLayout,

    /// The layout that the image will be transitioned to at the end of the render pass.
    ///
    /// The default value is [`ImageLayout::Undefined`], which must be overridden.
    pub final_layout: ImageLayout,

    /// Separate layouts for the stencil aspect of a depth/stencil attachment. If `None`, the
    /// stencil aspect uses `initial_layout` and `final_layout`.
    ///
    /// If `Some`, the
    /// [`separate_depth_stencil_layouts`](crate::capabilities) feature must be enabled and
    /// `format` must have a stencil aspect.
    ///
    /// The default value is `None`.
    pub stencil_layout: Option<StencilLayoutOverride>,

    pub _ne: crate::NonExhaustive,
}

impl Default for AttachmentDescription {
    #[inline]
    fn default() -> Self {
        Self {
            format: Format::UNDEFINED,
            samples: SampleCount::Sample1,
            load_op: LoadOp::DontCare,
            store_op: StoreOp::DontCare,
            stencil_load_op: LoadOp::DontCare,
            stencil_store_op: StoreOp::DontCare,
            initial_layout: ImageLayout::Undefined,
            final_layout: ImageLayout::Undefined,
            stencil_layout: None,
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl AttachmentDescription {
    /// Returns whether the attachment is cleared when it is first used, in any of its aspects.
    #[inline]
    pub(crate) fn clears(&self) -> bool {
        let aspects = self.format.aspects();

        (self.load_op == LoadOp::Clear
            && aspects.intersects(ImageAspects::COLOR | ImageAspects::DEPTH))
            || (self.stencil_load_op == LoadOp::Clear
                && aspects.intersects(ImageAspects::STENCIL))
    }
}

/// The layouts of the stencil aspect of an attachment, when they differ from the layouts of the
/// depth aspect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StencilLayoutOverride {
    /// The layout of the stencil aspect at the start of the render pass.
    pub initial_layout: ImageLayout,

    /// The layout of the stencil aspect at the end of the render pass.
    pub final_layout: ImageLayout,
}

/// Describes one of the subpasses of a render pass.
///
/// Attachment types of which there can be multiple are listed in a `Vec`. The index in these
/// `Vec`s corresponds to the index used for that attachment type in the shader. An unused index
/// is `None`.
///
/// If an attachment is used more than once in the subpass, then every reference to it must use
/// the same layout.
#[derive(Clone, Debug)]
pub struct SubpassDescription {
    /// The kind of pipeline the subpass is used with. Only graphics subpasses are supported.
    ///
    /// The default value is [`PipelineBindPoint::Graphics`].
    pub pipeline_bind_point: PipelineBindPoint,

    /// If not `0`, enables multiview rendering, and specifies the view indices that are rendered
    /// to in this subpass.
    ///
    /// If set to a nonzero value, it must be nonzero for all subpasses in the render pass, and
    /// the `multiview` feature must be enabled.
    ///
    /// The default value is `0`.
    pub view_mask: u32,

    /// The attachments that are to be used as input attachments in this subpass.
    ///
    /// If an attachment is used here for the first time in this render pass, then the
    /// attachment's `load_op` must not be [`LoadOp::Clear`].
    ///
    /// The default value is empty.
    pub input_attachments: Vec<Option<AttachmentReference>>,

    /// The attachments that are to be used as color attachments in this subpass.
    ///
    /// The number of color attachments must not exceed the `max_color_attachments` limit. All
    /// color attachments must have the same `samples` value.
    ///
    /// The default value is empty.
    pub color_attachments: Vec<Option<AttachmentReference>>,

    /// The attachments that are to be used as resolve attachments in this subpass.
    ///
    /// This list must either be empty or have the same length as `color_attachments`. Each
    /// resolve attachment is paired with the color attachment of the same index.
    ///
    /// The default value is empty.
    pub resolve_attachments: Vec<Option<AttachmentReference>>,

    /// The single attachment that is to be used as depth-stencil attachment in this subpass.
    ///
    /// The default value is `None`.
    pub depth_stencil_attachment: Option<AttachmentReference>,

    /// The indices of attachments that will be preserved during this subpass.
    ///
    /// The referenced attachments must not be used as any other attachment type in the subpass.
    ///
    /// The default value is empty.
    pub preserve_attachments: Vec<u32>,

    pub _ne: crate::NonExhaustive,
}

impl Default for SubpassDescription {
    #[inline]
    fn default() -> Self {
        Self {
            pipeline_bind_point: PipelineBindPoint::Graphics,
            view_mask: 0,
            input_attachments: Vec::new(),
            color_attachments: Vec::new(),
            resolve_attachments: Vec::new(),
            depth_stencil_attachment: None,
            preserve_attachments: Vec::new(),
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl SubpassDescription {
    /// Returns every used reference of the subpass, with how it is used.
    pub(crate) fn references(
        &self,
    ) -> impl Iterator<Item = (AttachmentUsage, usize, &AttachmentReference)> {
        let color = (self.color_attachments.iter().enumerate())
            .filter_map(|(index, r)| Some((AttachmentUsage::Color, index, r.as_ref()?)));
        let resolve = (self.resolve_attachments.iter().enumerate())
            .filter_map(|(index, r)| Some((AttachmentUsage::Resolve, index, r.as_ref()?)));
        let depth_stencil = (self.depth_stencil_attachment.iter())
            .map(|r| (AttachmentUsage::DepthStencil, 0, r));
        let input = (self.input_attachments.iter().enumerate())
            .filter_map(|(index, r)| Some((AttachmentUsage::Input, index, r.as_ref()?)));

        color.chain(resolve).chain(depth_stencil).chain(input)
    }

    /// Returns whether the subpass references `attachment` other than by preserving it.
    #[inline]
    pub(crate) fn uses_attachment(&self, attachment: u32) -> bool {
        self.references().any(|(_, _, r)| r.attachment == attachment)
    }

    /// Returns whether the subpass writes to `attachment`.
    #[inline]
    pub(crate) fn writes_attachment(&self, attachment: u32) -> bool {
        self.references().any(|(usage, _, r)| {
            r.attachment == attachment
                && match usage {
                    AttachmentUsage::Color | AttachmentUsage::Resolve => true,
                    AttachmentUsage::DepthStencil => !matches!(
                        r.layout,
                        ImageLayout::DepthStencilReadOnlyOptimal
                            | ImageLayout::DepthReadOnlyOptimal
                            | ImageLayout::StencilReadOnlyOptimal
                            | ImageLayout::ReadOnlyOptimal
                    ),
                    AttachmentUsage::Input => false,
                }
        })
    }

    /// Returns whether the subpass reads `attachment` as an input attachment.
    #[inline]
    pub(crate) fn reads_input(&self, attachment: u32) -> bool {
        self.input_attachments
            .iter()
            .flatten()
            .any(|r| r.attachment == attachment)
    }
}

/// A reference in a subpass description to a particular attachment of the render pass.
#[derive(Clone, Debug)]
pub struct AttachmentReference {
    /// The index of the attachment being referred to.
    ///
    /// The default value is `0`.
    pub attachment: u32,

    /// The image layout that the attachment should be transitioned to at the start of the
    /// subpass.
    ///
    /// The layout is restricted by the type of attachment that an attachment is being used as.
    ///
    /// The default value is [`ImageLayout::Undefined`], which must be overridden.
    pub layout: ImageLayout,

    /// For references to input attachments, the aspects of the image that should be selected.
    /// Ignored for other attachment types.
    ///
    /// Must not be empty for input attachments, and must only contain aspects of the format of
    /// the attachment.
    ///
    /// The default value is empty.
    pub aspects: ImageAspects,

    pub _ne: crate::NonExhaustive,
}

impl Default for AttachmentReference {
    #[inline]
    fn default() -> Self {
        Self {
            attachment: 0,
            layout: ImageLayout::Undefined,
            aspects: ImageAspects::empty(),
            _ne: crate::NonExhaustive(()),
        }
    }
}

/// A dependency between two subpasses of a render pass, or between a subpass and commands
/// outside the render pass.
///
/// If `src_subpass` and `dst_subpass` are equal, then this specifies a subpass self-dependency.
/// The `src_stages` must all be logically earlier in the pipeline than the `dst_stages`, unless
/// they are all framebuffer-space stages and `DependencyFlags::BY_REGION` is set. If both contain
/// a framebuffer-space stage, then `DependencyFlags::BY_REGION` must be set.
///
/// If `src_subpass` or `dst_subpass` is `None`, this specifies an external dependency. The values
/// must not both be `None`.
#[derive(Clone, Debug)]
pub struct SubpassDependency {
    /// The index of the subpass that writes the data that `dst_subpass` is going to use.
    /// `None` specifies an external dependency.
    ///
    /// The default value is `None`.
    pub src_subpass: Option<u32>,

    /// The index of the subpass that reads the data that `src_subpass` wrote.
    /// `None` specifies an external dependency.
    ///
    /// The default value is `None`.
    pub dst_subpass: Option<u32>,

    /// The pipeline stages that must be finished on `src_subpass` before the `dst_stages` of
    /// `dst_subpass` can start.
    ///
    /// The default value is empty.
    pub src_stages: PipelineStages,

    /// The pipeline stages of `dst_subpass` that must wait for the `src_stages` of
    /// `src_subpass` to be finished.
    ///
    /// The default value is empty.
    pub dst_stages: PipelineStages,

    /// The way `src_subpass` accesses the attachments on which we depend.
    ///
    /// The default value is empty.
    pub src_access: AccessFlags,

    /// The way `dst_subpass` accesses the attachments on which we depend.
    ///
    /// The default value is empty.
    pub dst_access: AccessFlags,

    /// Flags that modify the dependency.
    ///
    /// The default value is empty.
    pub dependency_flags: DependencyFlags,

    /// For view-local dependencies, each view `d` in `dst_subpass` depends on view
    /// `d + view_offset` in `src_subpass`. Must be `0` if `dependency_flags` doesn't contain
    /// `DependencyFlags::VIEW_LOCAL`, and for self-dependencies.
    ///
    /// The default value is `0`.
    pub view_offset: i32,

    pub _ne: crate::NonExhaustive,
}

impl Default for SubpassDependency {
    #[inline]
    fn default() -> Self {
        Self {
            src_subpass: None,
            dst_subpass: None,
            src_stages: PipelineStages::empty(),
            dst_stages: PipelineStages::empty(),
            src_access: AccessFlags::empty(),
            dst_access: AccessFlags::empty(),
            dependency_flags: DependencyFlags::empty(),
            view_offset: 0,
            _ne: crate::NonExhaustive(()),
        }
    }
}

/// A render pass as recorded in the object graph.
#[derive(Debug)]
pub struct RenderPass {
    create_info: RenderPassCreateInfo,
    flavor: Flavor,
    edge_states: Vec<EdgeState>,
    attachment_usage: Vec<ImageUsage>,
}

impl RenderPass {
    pub(crate) fn new(
        create_info: RenderPassCreateInfo,
        flavor: Flavor,
        edge_states: Vec<EdgeState>,
    ) -> Self {
        let mut attachment_usage = vec![ImageUsage::empty(); create_info.attachments.len()];

        for subpass in &create_info.subpasses {
            for (usage, _, reference) in subpass.references() {
                if let Some(attachment_usage) =
                    attachment_usage.get_mut(reference.attachment as usize)
                {
                    *attachment_usage |= match usage {
                        AttachmentUsage::Color | AttachmentUsage::Resolve => {
                            ImageUsage::COLOR_ATTACHMENT
                        }
                        AttachmentUsage::DepthStencil => ImageUsage::DEPTH_STENCIL_ATTACHMENT,
                        AttachmentUsage::Input => ImageUsage::INPUT_ATTACHMENT,
                    };
                }
            }
        }

        RenderPass {
            create_info,
            flavor,
            edge_states,
            attachment_usage,
        }
    }

    /// Returns the attachments of the render pass.
    #[inline]
    pub fn attachments(&self) -> &[AttachmentDescription] {
        &self.create_info.attachments
    }

    /// Returns the subpasses of the render pass.
    #[inline]
    pub fn subpasses(&self) -> &[SubpassDescription] {
        &self.create_info.subpasses
    }

    /// Returns the dependencies of the render pass.
    #[inline]
    pub fn dependencies(&self) -> &[SubpassDependency] {
        &self.create_info.dependencies
    }

    /// Returns the correlated view masks of the render pass.
    #[inline]
    pub fn correlated_view_masks(&self) -> &[u32] {
        &self.create_info.correlated_view_masks
    }

    /// Returns the format the render pass was described in.
    #[inline]
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Returns the state each dependency ended up in. For a render pass that was created, every
    /// state is [`EdgeState::Accepted`].
    #[inline]
    pub fn edge_states(&self) -> &[EdgeState] {
        &self.edge_states
    }

    /// Returns the image usages that an image view must have to be bound to `attachment` in a
    /// framebuffer.
    #[inline]
    pub fn attachment_usage(&self, attachment: u32) -> ImageUsage {
        self.attachment_usage
            .get(attachment as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Returns whether the subpasses use multiview rendering.
    #[inline]
    pub fn is_multiview(&self) -> bool {
        self.create_info
            .subpasses
            .iter()
            .any(|subpass| subpass.view_mask != 0)
    }

    /// Returns the number of views rendered to by the render pass, which is one more than the
    /// highest bit set in any view mask.
    #[inline]
    pub fn view_count(&self) -> u32 {
        let mask = (self.create_info.subpasses.iter()).fold(0, |mask, subpass| {
            mask | subpass.view_mask
        });

        u32::BITS - mask.leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationMode;

    fn color(attachment: u32) -> Option<AttachmentReference> {
        Some(AttachmentReference {
            attachment,
            layout: ImageLayout::ColorAttachmentOptimal,
            ..Default::default()
        })
    }

    fn create_info() -> RenderPassCreateInfo {
        RenderPassCreateInfo {
            attachments: vec![
                AttachmentDescription {
                    format: Format::R8G8B8A8_UNORM,
                    load_op: LoadOp::Clear,
                    store_op: StoreOp::Store,
                    final_layout: ImageLayout::ColorAttachmentOptimal,
                    ..Default::default()
                },
                AttachmentDescription {
                    format: Format::D32_SFLOAT,
                    load_op: LoadOp::Clear,
                    final_layout: ImageLayout::DepthStencilAttachmentOptimal,
                    ..Default::default()
                },
            ],
            subpasses: vec![
                SubpassDescription {
                    color_attachments: vec![color(0)],
                    depth_stencil_attachment: Some(AttachmentReference {
                        attachment: 1,
                        layout: ImageLayout::DepthStencilAttachmentOptimal,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                SubpassDescription {
                    input_attachments: vec![Some(AttachmentReference {
                        attachment: 1,
                        layout: ImageLayout::DepthStencilReadOnlyOptimal,
                        aspects: ImageAspects::DEPTH,
                        ..Default::default()
                    })],
                    color_attachments: vec![color(0)],
                    ..Default::default()
                },
            ],
            dependencies: vec![SubpassDependency {
                src_subpass: Some(0),
                dst_subpass: Some(1),
                src_stages: PipelineStages::LATE_FRAGMENT_TESTS,
                dst_stages: PipelineStages::FRAGMENT_SHADER,
                src_access: AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
                dst_access: AccessFlags::INPUT_ATTACHMENT_READ,
                dependency_flags: DependencyFlags::BY_REGION,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn deferred_shading_pass() {
        let create_info = create_info();
        let capabilities = CapabilitySet::new();
        let mut edge_states = Vec::new();

        ValidationReport::run(ValidationMode::CollectAll, |report| {
            edge_states = create_info.validate(&capabilities, Flavor::V2, report)?;
            Ok(())
        })
        .unwrap();

        assert_eq!(edge_states, [EdgeState::Accepted]);

        let render_pass = RenderPass::new(create_info, Flavor::V2, edge_states);
        assert_eq!(
            render_pass.attachment_usage(1),
            ImageUsage::DEPTH_STENCIL_ATTACHMENT | ImageUsage::INPUT_ATTACHMENT,
        );
        assert_eq!(render_pass.attachment_usage(0), ImageUsage::COLOR_ATTACHMENT);
        assert!(!render_pass.is_multiview());
        assert_eq!(render_pass.view_count(), 0);
    }

    #[test]
    fn first_use() {
        let create_info = create_info();

        assert_eq!(create_info.first_use(1), Some(0));
        assert_eq!(create_info.first_use(2), None);
        assert!(create_info.subpasses[0].writes_attachment(1));
        assert!(!create_info.subpasses[1].writes_attachment(1));
        assert!(create_info.subpasses[1].reads_input(1));
    }

    #[test]
    fn no_subpasses() {
        let report = ValidationReport::run(ValidationMode::CollectAll, |report| {
            RenderPassCreateInfo::default()
                .validate(&CapabilitySet::new(), Flavor::V1, report)
                .map(|_| ())
        })
        .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkRenderPassCreateInfo-subpassCount-arraylength"],
        );
    }
}
