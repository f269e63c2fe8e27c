// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The two plain data formats a render pass can be described in.
//!
//! [`RenderPassDescriptorV1`] follows `VkRenderPassCreateInfo` together with the structures that
//! could be chained to it: the multiview view masks, view offsets and correlation masks are held
//! in arrays parallel to the subpasses and dependencies, and the aspects of input attachments are
//! given by separate aspect references. [`RenderPassDescriptorV2`] follows
//! `VkRenderPassCreateInfo2`, where each of these lives on the structure it belongs to.
//!
//! Attachment and subpass indices are raw `u32` values, with [`ATTACHMENT_UNUSED`] and
//! [`SUBPASS_EXTERNAL`] as the special values, so that descriptions can be written out and read
//! back with `serde` when the `serde` feature is enabled.
//!
//! Both formats are lifted into a [`RenderPassCreateInfo`], which is what the rules check. Lifting
//! the original format can itself fail, when the parallel arrays do not fit the description.

use super::{
    AttachmentDescription, AttachmentReference, LoadOp, PipelineBindPoint, RenderPassCreateInfo,
    StencilLayoutOverride, StoreOp, SubpassDependency, SubpassDescription, ATTACHMENT_UNUSED,
    SUBPASS_EXTERNAL,
};
use crate::{
    format::Format,
    image::{ImageAspects, ImageLayout, SampleCount},
    report::Halt,
    sync::{AccessFlags, DependencyFlags, PipelineStages},
    ErrorKind, ValidationError, ValidationMode, ValidationReport,
};

/// A render pass in the format of `VkRenderPassCreateInfo`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderPassDescriptorV1 {
    pub attachments: Vec<AttachmentDescriptorV1>,
    pub subpasses: Vec<SubpassDescriptorV1>,
    pub dependencies: Vec<SubpassDependencyDescriptorV1>,

    /// The view mask of each subpass. Empty if multiview is not used, otherwise the same length as
    /// `subpasses`.
    pub view_masks: Vec<u32>,

    /// The view offset of each dependency. Empty if all offsets are zero, otherwise the same
    /// length as `dependencies`.
    pub view_offsets: Vec<i32>,

    /// The sets of views that may be more efficient to render concurrently.
    pub correlation_masks: Vec<u32>,

    /// The aspects that input attachments read. An input attachment without an entry here reads
    /// every aspect of the format of its attachment.
    pub input_attachment_aspects: Vec<InputAttachmentAspectReference>,
}

/// An attachment in the format of `VkAttachmentDescription`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttachmentDescriptorV1 {
    pub format: Format,
    pub samples: SampleCount,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub initial_layout: ImageLayout,
    pub final_layout: ImageLayout,
}

impl Default for AttachmentDescriptorV1 {
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
        }
    }
}

/// An attachment reference in the format of `VkAttachmentReference`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttachmentReferenceV1 {
    /// The index of the attachment, or [`ATTACHMENT_UNUSED`].
    pub attachment: u32,
    pub layout: ImageLayout,
}

impl AttachmentReferenceV1 {
    /// A reference that doesn't refer to any attachment.
    pub const UNUSED: Self = AttachmentReferenceV1 {
        attachment: ATTACHMENT_UNUSED,
        layout: ImageLayout::Undefined,
    };
}

/// A subpass in the format of `VkSubpassDescription`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SubpassDescriptorV1 {
    pub pipeline_bind_point: PipelineBindPoint,
    pub input_attachments: Vec<AttachmentReferenceV1>,
    pub color_attachments: Vec<AttachmentReferenceV1>,
    pub resolve_attachments: Vec<AttachmentReferenceV1>,
    pub depth_stencil_attachment: Option<AttachmentReferenceV1>,
    pub preserve_attachments: Vec<u32>,
}

/// A dependency in the format of `VkSubpassDependency`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SubpassDependencyDescriptorV1 {
    /// The source subpass, or [`SUBPASS_EXTERNAL`].
    pub src_subpass: u32,
    /// The destination subpass, or [`SUBPASS_EXTERNAL`].
    pub dst_subpass: u32,
    pub src_stages: PipelineStages,
    pub dst_stages: PipelineStages,
    pub src_access: AccessFlags,
    pub dst_access: AccessFlags,
    pub dependency_flags: DependencyFlags,
}

/// Selects the aspects an input attachment reads, in the format of
/// `VkInputAttachmentAspectReference`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputAttachmentAspectReference {
    pub subpass: u32,
    pub input_attachment_index: u32,
    pub aspects: ImageAspects,
}

/// A render pass in the format of `VkRenderPassCreateInfo2`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderPassDescriptorV2 {
    pub attachments: Vec<AttachmentDescriptorV2>,
    pub subpasses: Vec<SubpassDescriptorV2>,
    pub dependencies: Vec<SubpassDependencyDescriptorV2>,
    pub correlated_view_masks: Vec<u32>,
}

/// An attachment in the format of `VkAttachmentDescription2`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AttachmentDescriptorV2 {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub base: AttachmentDescriptorV1,

    /// The layouts of the stencil aspect, if they differ from those of the depth aspect.
    pub stencil_layout: Option<StencilLayoutOverride>,
}

/// An attachment reference in the format of `VkAttachmentReference2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttachmentReferenceV2 {
    /// The index of the attachment, or [`ATTACHMENT_UNUSED`].
    pub attachment: u32,
    pub layout: ImageLayout,
    /// Only meaningful for input attachments.
    pub aspects: ImageAspects,
}

impl AttachmentReferenceV2 {
    /// A reference that doesn't refer to any attachment.
    pub const UNUSED: Self = AttachmentReferenceV2 {
        attachment: ATTACHMENT_UNUSED,
        layout: ImageLayout::Undefined,
        aspects: ImageAspects::empty(),
    };
}

/// A subpass in the format of `VkSubpassDescription2`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SubpassDescriptorV2 {
    pub pipeline_bind_point: PipelineBindPoint,
    pub view_mask: u32,
    pub input_attachments: Vec<AttachmentReferenceV2>,
    pub color_attachments: Vec<AttachmentReferenceV2>,
    pub resolve_attachments: Vec<AttachmentReferenceV2>,
    pub depth_stencil_attachment: Option<AttachmentReferenceV2>,
    pub preserve_attachments: Vec<u32>,
}

/// A dependency in the format of `VkSubpassDependency2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SubpassDependencyDescriptorV2 {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub base: SubpassDependencyDescriptorV1,
    pub view_offset: i32,
}

fn subpass_index(subpass: u32) -> Option<u32> {
    (subpass != SUBPASS_EXTERNAL).then_some(subpass)
}

fn lift_attachment(
    attachment: &AttachmentDescriptorV1,
    stencil_layout: Option<StencilLayoutOverride>,
) -> AttachmentDescription {
    let &AttachmentDescriptorV1 {
        format,
        samples,
        load_op,
        store_op,
        stencil_load_op,
        stencil_store_op,
        initial_layout,
        final_layout,
    } = attachment;

    AttachmentDescription {
        format,
        samples,
        load_op,
        store_op,
        stencil_load_op,
        stencil_store_op,
        initial_layout,
        final_layout,
        stencil_layout,
        ..Default::default()
    }
}

fn lift_reference(
    attachment: u32,
    layout: ImageLayout,
    aspects: ImageAspects,
) -> Option<AttachmentReference> {
    (attachment != ATTACHMENT_UNUSED).then(|| AttachmentReference {
        attachment,
        layout,
        aspects,
        ..Default::default()
    })
}

fn lift_dependency(
    dependency: &SubpassDependencyDescriptorV1,
    view_offset: i32,
) -> SubpassDependency {
    SubpassDependency {
        src_subpass: subpass_index(dependency.src_subpass),
        dst_subpass: subpass_index(dependency.dst_subpass),
        src_stages: dependency.src_stages,
        dst_stages: dependency.dst_stages,
        src_access: dependency.src_access,
        dst_access: dependency.dst_access,
        dependency_flags: dependency.dependency_flags,
        view_offset,
        ..Default::default()
    }
}

impl RenderPassDescriptorV1 {
    /// Lifts the description into a [`RenderPassCreateInfo`].
    ///
    /// This only checks that the multiview arrays and the input attachment aspect references fit
    /// the rest of the description. The render pass rules themselves are checked when the render
    /// pass is created.
    pub fn lift(&self, mode: ValidationMode) -> Result<RenderPassCreateInfo, ValidationReport> {
        ValidationReport::evaluate(mode, |report| self.check_lift(report))
    }

    pub(crate) fn check_lift(
        &self,
        report: &mut ValidationReport,
    ) -> Result<RenderPassCreateInfo, Halt> {
        let RenderPassDescriptorV1 {
            attachments,
            subpasses,
            dependencies,
            view_masks,
            view_offsets,
            correlation_masks,
            input_attachment_aspects,
        } = self;

        if !view_masks.is_empty() && view_masks.len() != subpasses.len() {
            report.push(Box::new(ValidationError {
                context: "view_masks".into(),
                problem: "is not empty, but its length is not equal to the number of subpasses"
                    .into(),
                vuids: &["VUID-VkRenderPassCreateInfo-pNext-01928"],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        if !view_offsets.is_empty() && view_offsets.len() != dependencies.len() {
            report.push(Box::new(ValidationError {
                context: "view_offsets".into(),
                problem: "is not empty, but its length is not equal to the number of \
                    dependencies"
                    .into(),
                vuids: &["VUID-VkRenderPassCreateInfo-pNext-01929"],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        let mut input_aspects: Vec<Vec<Option<ImageAspects>>> = subpasses
            .iter()
            .map(|subpass| vec![None; subpass.input_attachments.len()])
            .collect();

        for (index, aspect_reference) in input_attachment_aspects.iter().enumerate() {
            let &InputAttachmentAspectReference {
                subpass,
                input_attachment_index,
                aspects,
            } = aspect_reference;

            let Some(subpass_aspects) = input_aspects.get_mut(subpass as usize) else {
                report.push(Box::new(ValidationError {
                    context: format!("input_attachment_aspects[{}].subpass", index).into(),
                    problem: "is not less than the number of subpasses".into(),
                    vuids: &["VUID-VkRenderPassCreateInfo-pNext-01926"],
                    kind: ErrorKind::Structural,
                    ..Default::default()
                }))?;
                continue;
            };

            let Some(slot) = subpass_aspects.get_mut(input_attachment_index as usize) else {
                report.push(Box::new(ValidationError {
                    context: format!(
                        "input_attachment_aspects[{}].input_attachment_index",
                        index,
                    )
                    .into(),
                    problem: "is not less than the number of input attachments of the subpass"
                        .into(),
                    vuids: &["VUID-VkRenderPassCreateInfo-pNext-01927"],
                    kind: ErrorKind::Structural,
                    ..Default::default()
                }))?;
                continue;
            };

            *slot = Some(aspects);
        }

        let lifted_subpasses = subpasses
            .iter()
            .zip(input_aspects)
            .enumerate()
            .map(|(index, (subpass, input_aspects))| {
                let lift_v1 = |reference: &AttachmentReferenceV1| {
                    lift_reference(reference.attachment, reference.layout, ImageAspects::empty())
                };

                SubpassDescription {
                    pipeline_bind_point: subpass.pipeline_bind_point,
                    view_mask: view_masks.get(index).copied().unwrap_or(0),
                    input_attachments: (subpass.input_attachments.iter())
                        .zip(input_aspects)
                        .map(|(reference, aspects)| {
                            let aspects = aspects.unwrap_or_else(|| {
                                attachments
                                    .get(reference.attachment as usize)
                                    .map_or(ImageAspects::empty(), |attachment| {
                                        attachment.format.aspects()
                                            - (ImageAspects::PLANE_0
                                                | ImageAspects::PLANE_1
                                                | ImageAspects::PLANE_2)
                                    })
                            });

                            lift_reference(reference.attachment, reference.layout, aspects)
                        })
                        .collect(),
                    color_attachments: subpass.color_attachments.iter().map(lift_v1).collect(),
                    resolve_attachments: (subpass.resolve_attachments.iter())
                        .map(lift_v1)
                        .collect(),
                    depth_stencil_attachment: (subpass.depth_stencil_attachment.as_ref())
                        .and_then(lift_v1),
                    preserve_attachments: subpass.preserve_attachments.clone(),
                    ..Default::default()
                }
            })
            .collect();

        Ok(RenderPassCreateInfo {
            attachments: (attachments.iter())
                .map(|attachment| lift_attachment(attachment, None))
                .collect(),
            subpasses: lifted_subpasses,
            dependencies: (dependencies.iter().enumerate())
                .map(|(index, dependency)| {
                    lift_dependency(dependency, view_offsets.get(index).copied().unwrap_or(0))
                })
                .collect(),
            correlated_view_masks: correlation_masks.clone(),
            ..Default::default()
        })
    }
}

impl From<&RenderPassDescriptorV2> for RenderPassCreateInfo {
    fn from(descriptor: &RenderPassDescriptorV2) -> Self {
        let lift_v2 = |reference: &AttachmentReferenceV2| {
            lift_reference(reference.attachment, reference.layout, reference.aspects)
        };

        RenderPassCreateInfo {
            attachments: (descriptor.attachments.iter())
                .map(|attachment| lift_attachment(&attachment.base, attachment.stencil_layout))
                .collect(),
            subpasses: (descriptor.subpasses.iter())
                .map(|subpass| SubpassDescription {
                    pipeline_bind_point: subpass.pipeline_bind_point,
                    view_mask: subpass.view_mask,
                    input_attachments: subpass.input_attachments.iter().map(lift_v2).collect(),
                    color_attachments: subpass.color_attachments.iter().map(lift_v2).collect(),
                    resolve_attachments: (subpass.resolve_attachments.iter())
                        .map(lift_v2)
                        .collect(),
                    depth_stencil_attachment: (subpass.depth_stencil_attachment.as_ref())
                        .and_then(lift_v2),
                    preserve_attachments: subpass.preserve_attachments.clone(),
                    ..Default::default()
                })
                .collect(),
            dependencies: (descriptor.dependencies.iter())
                .map(|dependency| lift_dependency(&dependency.base, dependency.view_offset))
                .collect(),
            correlated_view_masks: descriptor.correlated_view_masks.clone(),
            ..Default::default()
        }
    }
}

impl From<RenderPassDescriptorV2> for RenderPassCreateInfo {
    #[inline]
    fn from(descriptor: RenderPassDescriptorV2) -> Self {
        Self::from(&descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g_buffer_v1() -> RenderPassDescriptorV1 {
        RenderPassDescriptorV1 {
            attachments: vec![
                AttachmentDescriptorV1 {
                    format: Format::R8G8B8A8_UNORM,
                    load_op: LoadOp::Clear,
                    store_op: StoreOp::Store,
                    final_layout: ImageLayout::PresentSrc,
                    ..Default::default()
                },
                AttachmentDescriptorV1 {
                    format: Format::D24_UNORM_S8_UINT,
                    load_op: LoadOp::Clear,
                    final_layout: ImageLayout::DepthStencilAttachmentOptimal,
                    ..Default::default()
                },
            ],
            subpasses: vec![
                SubpassDescriptorV1 {
                    depth_stencil_attachment: Some(AttachmentReferenceV1 {
                        attachment: 1,
                        layout: ImageLayout::DepthStencilAttachmentOptimal,
                    }),
                    ..Default::default()
                },
                SubpassDescriptorV1 {
                    color_attachments: vec![AttachmentReferenceV1 {
                        attachment: 0,
                        layout: ImageLayout::ColorAttachmentOptimal,
                    }],
                    input_attachments: vec![
                        AttachmentReferenceV1 {
                            attachment: 1,
                            layout: ImageLayout::DepthStencilReadOnlyOptimal,
                        },
                        AttachmentReferenceV1::UNUSED,
                    ],
                    ..Default::default()
                },
            ],
            dependencies: vec![SubpassDependencyDescriptorV1 {
                src_subpass: 0,
                dst_subpass: 1,
                src_stages: PipelineStages::LATE_FRAGMENT_TESTS,
                dst_stages: PipelineStages::FRAGMENT_SHADER,
                src_access: AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
                dst_access: AccessFlags::INPUT_ATTACHMENT_READ,
                dependency_flags: DependencyFlags::BY_REGION,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn lift_v1() {
        let create_info = g_buffer_v1().lift(ValidationMode::FailFast).unwrap();

        assert_eq!(create_info.attachments.len(), 2);
        assert!(create_info.attachments[1].stencil_layout.is_none());

        let input_attachments = &create_info.subpasses[1].input_attachments;
        assert_eq!(input_attachments.len(), 2);
        assert_eq!(
            input_attachments[0].as_ref().unwrap().aspects,
            ImageAspects::DEPTH | ImageAspects::STENCIL,
        );
        assert!(input_attachments[1].is_none());
        assert_eq!(create_info.dependencies[0].src_subpass, Some(0));
        assert_eq!(create_info.dependencies[0].view_offset, 0);
    }

    #[test]
    fn aspect_references() {
        let mut descriptor = g_buffer_v1();
        descriptor.input_attachment_aspects = vec![InputAttachmentAspectReference {
            subpass: 1,
            input_attachment_index: 0,
            aspects: ImageAspects::DEPTH,
        }];

        let create_info = descriptor.lift(ValidationMode::FailFast).unwrap();
        assert_eq!(
            create_info.subpasses[1].input_attachments[0]
                .as_ref()
                .unwrap()
                .aspects,
            ImageAspects::DEPTH,
        );

        descriptor.input_attachment_aspects = vec![
            InputAttachmentAspectReference {
                subpass: 2,
                input_attachment_index: 0,
                aspects: ImageAspects::DEPTH,
            },
            InputAttachmentAspectReference {
                subpass: 0,
                input_attachment_index: 0,
                aspects: ImageAspects::DEPTH,
            },
        ];

        let report = descriptor.lift(ValidationMode::CollectAll).unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkRenderPassCreateInfo-pNext-01926",
                "VUID-VkRenderPassCreateInfo-pNext-01927",
            ],
        );
        assert!(report.kinds().all(|kind| kind == ErrorKind::Structural));
    }

    #[test]
    fn multiview_arrays() {
        let mut descriptor = g_buffer_v1();
        descriptor.view_masks = vec![0b11];
        descriptor.view_offsets = vec![0, 1];

        let report = descriptor.lift(ValidationMode::CollectAll).unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkRenderPassCreateInfo-pNext-01928",
                "VUID-VkRenderPassCreateInfo-pNext-01929",
            ],
        );

        descriptor.view_masks = vec![0b11, 0b11];
        descriptor.view_offsets = vec![1];
        descriptor.dependencies[0].src_subpass = SUBPASS_EXTERNAL;

        let create_info = descriptor.lift(ValidationMode::FailFast).unwrap();
        assert_eq!(create_info.subpasses[1].view_mask, 0b11);
        assert_eq!(create_info.dependencies[0].view_offset, 1);
        assert_eq!(create_info.dependencies[0].src_subpass, None);
    }

    #[test]
    fn lift_v2() {
        let descriptor = RenderPassDescriptorV2 {
            attachments: vec![AttachmentDescriptorV2 {
                base: AttachmentDescriptorV1 {
                    format: Format::D32_SFLOAT_S8_UINT,
                    final_layout: ImageLayout::DepthAttachmentOptimal,
                    ..Default::default()
                },
                stencil_layout: Some(StencilLayoutOverride {
                    initial_layout: ImageLayout::Undefined,
                    final_layout: ImageLayout::StencilAttachmentOptimal,
                }),
            }],
            subpasses: vec![SubpassDescriptorV2 {
                view_mask: 0b1,
                color_attachments: vec![AttachmentReferenceV2::UNUSED],
                depth_stencil_attachment: Some(AttachmentReferenceV2 {
                    attachment: 0,
                    layout: ImageLayout::DepthAttachmentOptimal,
                    aspects: ImageAspects::empty(),
                }),
                ..Default::default()
            }],
            dependencies: vec![SubpassDependencyDescriptorV2 {
                base: SubpassDependencyDescriptorV1 {
                    src_subpass: SUBPASS_EXTERNAL,
                    dst_subpass: 0,
                    ..Default::default()
                },
                view_offset: 0,
            }],
            ..Default::default()
        };

        let create_info = RenderPassCreateInfo::from(&descriptor);
        assert!(create_info.attachments[0].stencil_layout.is_some());
        assert_eq!(create_info.subpasses[0].view_mask, 0b1);
        assert!(create_info.subpasses[0].color_attachments[0].is_none());
        assert_eq!(create_info.dependencies[0].src_subpass, None);
        assert_eq!(create_info.dependencies[0].dst_subpass, Some(0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn read_from_json() {
        let descriptor: RenderPassDescriptorV2 = serde_json::from_str(
            r#"{
                "attachments": [{
                    "format": "R8G8B8A8_UNORM",
                    "samples": "Sample1",
                    "load_op": "Clear",
                    "store_op": "Store",
                    "stencil_load_op": "DontCare",
                    "stencil_store_op": "DontCare",
                    "initial_layout": "Undefined",
                    "final_layout": "PresentSrc",
                    "stencil_layout": null
                }],
                "subpasses": [{
                    "color_attachments": [{
                        "attachment": 0,
                        "layout": "ColorAttachmentOptimal",
                        "aspects": 0
                    }]
                }]
            }"#,
        )
        .unwrap();

        let create_info = RenderPassCreateInfo::from(descriptor.clone());
        assert_eq!(create_info.attachments[0].format, Format::R8G8B8A8_UNORM);
        assert_eq!(create_info.subpasses.len(), 1);

        let json = serde_json::to_string(&descriptor).unwrap();
        let read_back: RenderPassDescriptorV2 = serde_json::from_str(&json).unwrap();
        assert_eq!(read_back, descriptor);
    }
}
