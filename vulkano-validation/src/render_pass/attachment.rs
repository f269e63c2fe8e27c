// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use super::{
    AttachmentDescription, AttachmentReference, Flavor, LoadOp, PipelineBindPoint,
    RenderPassCreateInfo, ATTACHMENT_UNUSED,
};
use crate::{
    capabilities::CapabilitySet,
    image::{ImageAspects, ImageLayout, SampleCount},
    report::Halt,
    ErrorKind, Requires, RequiresAllOf, RequiresOneOf, ValidationError, ValidationMode,
    ValidationReport,
};
use smallvec::SmallVec;

const SEPARATE_DEPTH_STENCIL_LAYOUTS: RequiresOneOf = RequiresOneOf(&[RequiresAllOf(&[
    Requires::DeviceFeature("separate_depth_stencil_layouts"),
])]);

/// How a subpass uses an attachment it references.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttachmentUsage {
    /// The attachment is read by the fragment shader.
    Input,
    /// The attachment is written by the color output stage.
    Color,
    /// A multisampled color attachment is resolved into the attachment.
    Resolve,
    /// The attachment is used for depth and stencil tests.
    DepthStencil,
}

impl AttachmentUsage {
    fn field(self, index: usize) -> String {
        match self {
            AttachmentUsage::Input => format!("input_attachments[{}]", index),
            AttachmentUsage::Color => format!("color_attachments[{}]", index),
            AttachmentUsage::Resolve => format!("resolve_attachments[{}]", index),
            AttachmentUsage::DepthStencil => "depth_stencil_attachment".to_owned(),
        }
    }
}

/// The rules for single attachment descriptions and for the attachment references of one
/// subpass. None of them depend on the order of the subpasses or on their dependencies, which
/// are checked by [`SubpassGraphValidator`](super::SubpassGraphValidator).
///
/// ```
/// use vulkano_validation::{
///     format::Format,
///     image::ImageLayout,
///     render_pass::{AttachmentDescription, AttachmentRules},
///     CapabilitySet, ValidationMode,
/// };
///
/// let capabilities = CapabilitySet::new();
/// let rules = AttachmentRules::new(&capabilities).with_mode(ValidationMode::CollectAll);
///
/// let report = rules
///     .validate_description(&AttachmentDescription {
///         format: Format::R8G8B8A8_UNORM,
///         final_layout: ImageLayout::Undefined,
///         ..Default::default()
///     })
///     .unwrap_err();
///
/// assert!(report.contains("VUID-VkAttachmentDescription2-finalLayout-03061"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct AttachmentRules<'a> {
    capabilities: &'a CapabilitySet,
    flavor: Flavor,
    mode: ValidationMode,
}

impl<'a> AttachmentRules<'a> {
    /// Returns rules that check against `capabilities`, report the VUIDs of the extended render
    /// pass format and stop at the first violation.
    #[inline]
    pub fn new(capabilities: &'a CapabilitySet) -> Self {
        AttachmentRules {
            capabilities,
            flavor: Flavor::V2,
            mode: ValidationMode::FailFast,
        }
    }

    /// Sets the format whose VUIDs are reported.
    #[inline]
    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Sets whether evaluation stops at the first violation.
    #[inline]
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Checks a single attachment description on its own.
    pub fn validate_description(
        &self,
        description: &AttachmentDescription,
    ) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            self.check_description(description, report)
        })
    }

    /// Checks one reference of a subpass to the attachment at `reference.attachment`, used as
    /// `usage`.
    pub fn validate_reference(
        &self,
        reference: &AttachmentReference,
        attachments: &[AttachmentDescription],
        usage: AttachmentUsage,
    ) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            self.check_reference(reference, attachments, usage, report)
        })
    }

    /// Checks that the resolve attachments of a subpass fit its color attachments.
    ///
    /// References with an out-of-range attachment index are skipped; they are reported by
    /// [`validate_reference`](Self::validate_reference).
    pub fn validate_resolve_pairing(
        &self,
        color_attachments: &[Option<AttachmentReference>],
        resolve_attachments: &[Option<AttachmentReference>],
        attachments: &[AttachmentDescription],
    ) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            self.check_resolve_pairing(color_attachments, resolve_attachments, attachments, report)
        })
    }

    /// Checks every per-subpass rule for the subpass at index `subpass` of `create_info`.
    ///
    /// # Panics
    ///
    /// - Panics if `subpass` is out of range.
    pub fn validate_subpass(
        &self,
        create_info: &RenderPassCreateInfo,
        subpass: usize,
    ) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            report.scope(format!("subpasses[{}]", subpass), |report| {
                self.check_subpass(create_info, subpass, report)
            })
        })
    }

    pub(crate) fn check_description(
        &self,
        description: &AttachmentDescription,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let flavor = self.flavor;
        let &AttachmentDescription {
            format,
            samples: _,
            load_op: _,
            store_op,
            stencil_load_op: _,
            stencil_store_op,
            initial_layout,
            final_layout,
            stencil_layout,
            _ne: _,
        } = description;

        report.check(store_op.validate_capabilities(self.capabilities).map_err(|err| {
            err.add_context("store_op").set_vuids(flavored!(
                flavor,
                ["VUID-VkAttachmentDescription-storeOp-parameter"],
                ["VUID-VkAttachmentDescription2-storeOp-parameter"],
            ))
        }))?;

        report.check(
            stencil_store_op
                .validate_capabilities(self.capabilities)
                .map_err(|err| {
                    err.add_context("stencil_store_op").set_vuids(flavored!(
                        flavor,
                        ["VUID-VkAttachmentDescription-stencilStoreOp-parameter"],
                        ["VUID-VkAttachmentDescription2-stencilStoreOp-parameter"],
                    ))
                }),
        )?;

        report.check(
            initial_layout
                .validate_capabilities(self.capabilities)
                .map_err(|err| {
                    err.add_context("initial_layout").set_vuids(flavored!(
                        flavor,
                        ["VUID-VkAttachmentDescription-initialLayout-parameter"],
                        ["VUID-VkAttachmentDescription2-initialLayout-parameter"],
                    ))
                }),
        )?;

        report.check(
            final_layout
                .validate_capabilities(self.capabilities)
                .map_err(|err| {
                    err.add_context("final_layout").set_vuids(flavored!(
                        flavor,
                        ["VUID-VkAttachmentDescription-finalLayout-parameter"],
                        ["VUID-VkAttachmentDescription2-finalLayout-parameter"],
                    ))
                }),
        )?;

        if final_layout.is_uninitialized() {
            report.push(Box::new(ValidationError {
                context: "final_layout".into(),
                problem: "is `ImageLayout::Undefined` or `ImageLayout::Preinitialized`".into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkAttachmentDescription-finalLayout-00843"],
                    ["VUID-VkAttachmentDescription2-finalLayout-03061"],
                ),
                ..Default::default()
            }))?;
        }

        let separate_depth_stencil_layouts = self
            .capabilities
            .is_feature_enabled("separate_depth_stencil_layouts");

        if !separate_depth_stencil_layouts {
            if initial_layout.is_separate_depth_stencil() {
                report.push(Box::new(ValidationError {
                    context: "initial_layout".into(),
                    problem: "specifies a layout for only the depth aspect or only the \
                        stencil aspect"
                        .into(),
                    requires_one_of: SEPARATE_DEPTH_STENCIL_LAYOUTS,
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkAttachmentDescription-separateDepthStencilLayouts-03284"],
                        ["VUID-VkAttachmentDescription2-separateDepthStencilLayouts-03284"],
                    ),
                    ..Default::default()
                }))?;
            }

            if final_layout.is_separate_depth_stencil() {
                report.push(Box::new(ValidationError {
                    context: "final_layout".into(),
                    problem: "specifies a layout for only the depth aspect or only the \
                        stencil aspect"
                        .into(),
                    requires_one_of: SEPARATE_DEPTH_STENCIL_LAYOUTS,
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkAttachmentDescription-separateDepthStencilLayouts-03285"],
                        ["VUID-VkAttachmentDescription2-separateDepthStencilLayouts-03285"],
                    ),
                    ..Default::default()
                }))?;
            }
        }

        if format == crate::format::Format::UNDEFINED {
            report.push(Box::new(ValidationError {
                context: "format".into(),
                problem: "is `Format::UNDEFINED`".into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkAttachmentDescription-format-06698"],
                    ["VUID-VkAttachmentDescription2-format-06698"],
                ),
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;

            // The remaining rules depend on the aspects of the format.
            return Ok(());
        }

        let aspects = format.aspects();

        if aspects.intersects(ImageAspects::COLOR) {
            for (field, layout, combined_vuids, separate_vuids) in [
                (
                    "initial_layout",
                    initial_layout,
                    flavored!(
                        flavor,
                        ["VUID-VkAttachmentDescription-format-03280"],
                        ["VUID-VkAttachmentDescription2-format-03280"],
                    ),
                    flavored!(
                        flavor,
                        ["VUID-VkAttachmentDescription-format-06487"],
                        ["VUID-VkAttachmentDescription2-format-06487"],
                    ),
                ),
                (
                    "final_layout",
                    final_layout,
                    flavored!(
                        flavor,
                        ["VUID-VkAttachmentDescription-format-03282"],
                        ["VUID-VkAttachmentDescription2-format-03282"],
                    ),
                    flavored!(
                        flavor,
                        ["VUID-VkAttachmentDescription-format-06488"],
                        ["VUID-VkAttachmentDescription2-format-06488"],
                    ),
                ),
            ] {
                if layout.is_separate_depth_stencil() {
                    report.push(Box::new(ValidationError {
                        problem: format!(
                            "`format` has a color aspect, but `{}` is a depth-only or \
                            stencil-only layout",
                            field,
                        )
                        .into(),
                        vuids: separate_vuids,
                        ..Default::default()
                    }))?;
                } else if layout.is_depth_stencil_specific() {
                    report.push(Box::new(ValidationError {
                        problem: format!(
                            "`format` has a color aspect, but `{}` is a depth/stencil layout",
                            field,
                        )
                        .into(),
                        vuids: combined_vuids,
                        ..Default::default()
                    }))?;
                }
            }
        } else {
            for (field, layout, vuids) in [
                (
                    "initial_layout",
                    initial_layout,
                    flavored!(
                        flavor,
                        ["VUID-VkAttachmentDescription-format-03281"],
                        ["VUID-VkAttachmentDescription2-format-03281"],
                    ),
                ),
                (
                    "final_layout",
                    final_layout,
                    flavored!(
                        flavor,
                        ["VUID-VkAttachmentDescription-format-03283"],
                        ["VUID-VkAttachmentDescription2-format-03283"],
                    ),
                ),
            ] {
                if layout == ImageLayout::ColorAttachmentOptimal {
                    report.push(Box::new(ValidationError {
                        problem: format!(
                            "`format` is a depth/stencil format, but `{}` is \
                            `ImageLayout::ColorAttachmentOptimal`",
                            field,
                        )
                        .into(),
                        vuids,
                        ..Default::default()
                    }))?;
                }
            }

            let has_depth = aspects.intersects(ImageAspects::DEPTH);
            let has_stencil = aspects.intersects(ImageAspects::STENCIL);

            for (field, layout, index) in [
                ("initial_layout", initial_layout, 0),
                ("final_layout", final_layout, 1),
            ] {
                if has_depth && !has_stencil && layout.is_stencil_only() {
                    report.push(Box::new(ValidationError {
                        problem: format!(
                            "`format` only has a depth aspect, but `{}` is a stencil-only \
                            layout",
                            field,
                        )
                        .into(),
                        vuids: [
                            flavored!(
                                flavor,
                                ["VUID-VkAttachmentDescription-format-03290"],
                                ["VUID-VkAttachmentDescription2-format-03290"],
                            ),
                            flavored!(
                                flavor,
                                ["VUID-VkAttachmentDescription-format-03291"],
                                ["VUID-VkAttachmentDescription2-format-03291"],
                            ),
                        ][index],
                        ..Default::default()
                    }))?;
                }

                if has_stencil && !has_depth && layout.is_depth_only() {
                    report.push(Box::new(ValidationError {
                        problem: format!(
                            "`format` only has a stencil aspect, but `{}` is a depth-only \
                            layout",
                            field,
                        )
                        .into(),
                        vuids: [
                            flavored!(
                                flavor,
                                ["VUID-VkAttachmentDescription-format-03292"],
                                ["VUID-VkAttachmentDescription2-format-03292"],
                            ),
                            flavored!(
                                flavor,
                                ["VUID-VkAttachmentDescription-format-03293"],
                                ["VUID-VkAttachmentDescription2-format-03293"],
                            ),
                        ][index],
                        ..Default::default()
                    }))?;
                }

                if has_depth
                    && has_stencil
                    && stencil_layout.is_none()
                    && layout.is_separate_depth_stencil()
                {
                    report.push(Box::new(ValidationError {
                        problem: format!(
                            "`format` has both a depth and a stencil aspect, and `{}` is a \
                            depth-only or stencil-only layout, but `stencil_layout` is `None`",
                            field,
                        )
                        .into(),
                        vuids: [
                            flavored!(
                                flavor,
                                ["VUID-VkAttachmentDescription-format-06242"],
                                ["VUID-VkAttachmentDescription2-format-06906"],
                            ),
                            flavored!(
                                flavor,
                                ["VUID-VkAttachmentDescription-format-06243"],
                                ["VUID-VkAttachmentDescription2-format-06907"],
                            ),
                        ][index],
                        ..Default::default()
                    }))?;
                }
            }
        }

        if let Some(stencil_layout) = stencil_layout {
            report.scope("stencil_layout", |report| {
                self.check_stencil_layout(stencil_layout, aspects, report)
            })?;
        }

        Ok(())
    }

    fn check_stencil_layout(
        &self,
        stencil_layout: super::StencilLayoutOverride,
        aspects: ImageAspects,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let super::StencilLayoutOverride {
            initial_layout,
            final_layout,
        } = stencil_layout;

        if !self
            .capabilities
            .is_feature_enabled("separate_depth_stencil_layouts")
        {
            report.push(Box::new(ValidationError {
                problem: "is `Some`".into(),
                requires_one_of: SEPARATE_DEPTH_STENCIL_LAYOUTS,
                vuids: &["VUID-VkAttachmentDescription2-separateDepthStencilLayouts-03284"],
                ..Default::default()
            }))?;
        }

        if !aspects.intersects(ImageAspects::STENCIL) {
            report.push(Box::new(ValidationError {
                problem: "is `Some`, but `format` does not have a stencil aspect".into(),
                vuids: &["UNASSIGNED-AttachmentDescription-stencil-layout-without-stencil-aspect"],
                ..Default::default()
            }))?;
        }

        report.check(
            initial_layout
                .validate_capabilities(self.capabilities)
                .map_err(|err| {
                    err.add_context("initial_layout").set_vuids(&[
                        "VUID-VkAttachmentDescriptionStencilLayout-stencilInitialLayout-parameter",
                    ])
                }),
        )?;

        report.check(
            final_layout
                .validate_capabilities(self.capabilities)
                .map_err(|err| {
                    err.add_context("final_layout").set_vuids(&[
                        "VUID-VkAttachmentDescriptionStencilLayout-stencilFinalLayout-parameter",
                    ])
                }),
        )?;

        if !is_stencil_layout(initial_layout) {
            report.push(Box::new(ValidationError {
                context: "initial_layout".into(),
                problem: "is not a layout that can be used for the stencil aspect on its own"
                    .into(),
                vuids: &["VUID-VkAttachmentDescriptionStencilLayout-stencilInitialLayout-03308"],
                ..Default::default()
            }))?;
        }

        if !is_stencil_layout(final_layout) {
            report.push(Box::new(ValidationError {
                context: "final_layout".into(),
                problem: "is not a layout that can be used for the stencil aspect on its own"
                    .into(),
                vuids: &["VUID-VkAttachmentDescriptionStencilLayout-stencilFinalLayout-03309"],
                ..Default::default()
            }))?;
        }

        if final_layout.is_uninitialized() {
            report.push(Box::new(ValidationError {
                context: "final_layout".into(),
                problem: "is `ImageLayout::Undefined` or `ImageLayout::Preinitialized`".into(),
                vuids: &["VUID-VkAttachmentDescriptionStencilLayout-stencilFinalLayout-03310"],
                ..Default::default()
            }))?;
        }

        Ok(())
    }

    pub(crate) fn check_reference(
        &self,
        reference: &AttachmentReference,
        attachments: &[AttachmentDescription],
        usage: AttachmentUsage,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let flavor = self.flavor;
        let &AttachmentReference {
            attachment,
            layout,
            aspects,
            _ne: _,
        } = reference;

        if attachment == ATTACHMENT_UNUSED {
            return Ok(());
        }

        let Some(description) = attachments.get(attachment as usize) else {
            return report.push(Box::new(ValidationError {
                context: "attachment".into(),
                problem: format!(
                    "is {}, which is not less than the number of attachments ({})",
                    attachment,
                    attachments.len(),
                )
                .into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkRenderPassCreateInfo-attachment-00834"],
                    ["VUID-VkRenderPassCreateInfo2-attachment-03051"],
                ),
                ..Default::default()
            }));
        };

        report.check(layout.validate_capabilities(self.capabilities).map_err(|err| {
            err.add_context("layout").set_vuids(flavored!(
                flavor,
                ["VUID-VkAttachmentReference-layout-parameter"],
                ["VUID-VkAttachmentReference2-layout-parameter"],
            ))
        }))?;

        if layout.is_separate_depth_stencil()
            && !self
                .capabilities
                .is_feature_enabled("separate_depth_stencil_layouts")
        {
            report.push(Box::new(ValidationError {
                context: "layout".into(),
                problem: "specifies a layout for only the depth aspect or only the stencil \
                    aspect"
                    .into(),
                requires_one_of: SEPARATE_DEPTH_STENCIL_LAYOUTS,
                vuids: flavored!(
                    flavor,
                    ["VUID-VkAttachmentReference-separateDepthStencilLayouts-03313"],
                    ["VUID-VkAttachmentReference2-separateDepthStencilLayouts-03313"],
                ),
                ..Default::default()
            }))?;
        }

        let (layout_is_legal, layout_vuids) = match usage {
            AttachmentUsage::Color => (
                !(layout.is_uninitialized()
                    || layout.is_depth_stencil_specific()
                    || matches!(
                        layout,
                        ImageLayout::PresentSrc | ImageLayout::ShaderReadOnlyOptimal
                    )),
                flavored!(
                    flavor,
                    [
                        "VUID-VkSubpassDescription-attachment-06913",
                        "VUID-VkSubpassDescription-attachment-06916",
                        "VUID-VkAttachmentReference-layout-03077",
                    ],
                    [
                        "VUID-VkSubpassDescription2-attachment-06913",
                        "VUID-VkSubpassDescription2-attachment-06916",
                        "VUID-VkAttachmentReference2-layout-03077",
                    ],
                ),
            ),
            AttachmentUsage::Resolve => (
                !(layout.is_uninitialized()
                    || layout.is_depth_stencil_specific()
                    || matches!(
                        layout,
                        ImageLayout::PresentSrc | ImageLayout::ShaderReadOnlyOptimal
                    )),
                flavored!(
                    flavor,
                    [
                        "VUID-VkSubpassDescription-attachment-06914",
                        "VUID-VkSubpassDescription-attachment-06917",
                        "VUID-VkAttachmentReference-layout-03077",
                    ],
                    [
                        "VUID-VkSubpassDescription2-attachment-06914",
                        "VUID-VkSubpassDescription2-attachment-06917",
                        "VUID-VkAttachmentReference2-layout-03077",
                    ],
                ),
            ),
            AttachmentUsage::DepthStencil => (
                !(layout.is_uninitialized()
                    || matches!(
                        layout,
                        ImageLayout::PresentSrc
                            | ImageLayout::ColorAttachmentOptimal
                            | ImageLayout::ShaderReadOnlyOptimal
                    )),
                flavored!(
                    flavor,
                    [
                        "VUID-VkSubpassDescription-attachment-06915",
                        "VUID-VkAttachmentReference-layout-03077",
                    ],
                    [
                        "VUID-VkSubpassDescription2-attachment-06915",
                        "VUID-VkAttachmentReference2-layout-03077",
                    ],
                ),
            ),
            AttachmentUsage::Input => (
                !(layout.is_uninitialized()
                    || matches!(
                        layout,
                        ImageLayout::PresentSrc
                            | ImageLayout::ColorAttachmentOptimal
                            | ImageLayout::DepthStencilAttachmentOptimal
                    )),
                flavored!(
                    flavor,
                    [
                        "VUID-VkSubpassDescription-attachment-06912",
                        "VUID-VkAttachmentReference-layout-03077",
                    ],
                    [
                        "VUID-VkSubpassDescription2-attachment-06912",
                        "VUID-VkAttachmentReference2-layout-03077",
                    ],
                ),
            ),
        };

        if !layout_is_legal {
            report.push(Box::new(ValidationError {
                context: "layout".into(),
                problem: format!(
                    "is `ImageLayout::{:?}`, which cannot be used for {} attachments",
                    layout,
                    usage_name(usage),
                )
                .into(),
                vuids: layout_vuids,
                ..Default::default()
            }))?;
        }

        let format = description.format;

        if format == crate::format::Format::UNDEFINED {
            // Reported by the description rules.
            return Ok(());
        }

        let (format_is_supported, format_vuids): (bool, &'static [&'static str]) = match usage {
            AttachmentUsage::Color => (
                format.is_color() && format.planes() == 1,
                &["VUID-VkSubpassDescription2-pColorAttachments-02898"],
            ),
            AttachmentUsage::Resolve => (
                format.is_color() && format.planes() == 1,
                &["VUID-VkSubpassDescription2-pResolveAttachments-02899"],
            ),
            AttachmentUsage::DepthStencil => (
                format.is_depth_stencil(),
                &["VUID-VkSubpassDescription2-pDepthStencilAttachment-02900"],
            ),
            AttachmentUsage::Input => (
                format.planes() == 1,
                &["VUID-VkSubpassDescription2-pInputAttachments-02897"],
            ),
        };

        if !format_is_supported {
            report.push(Box::new(ValidationError {
                context: "attachment".into(),
                problem: format!(
                    "refers to an attachment whose format `Format::{:?}` cannot be used for {} \
                    attachments",
                    format,
                    usage_name(usage),
                )
                .into(),
                vuids: format_vuids,
                ..Default::default()
            }))?;
        }

        if usage == AttachmentUsage::Input {
            if aspects.is_empty() {
                report.push(Box::new(ValidationError {
                    context: "aspects".into(),
                    problem: "is empty for an input attachment".into(),
                    vuids: &["VUID-VkSubpassDescription2-attachment-02800"],
                    ..Default::default()
                }))?;
            } else if aspects.intersects(ImageAspects::METADATA) {
                report.push(Box::new(ValidationError {
                    context: "aspects".into(),
                    problem: "contains `ImageAspects::METADATA`".into(),
                    vuids: &["VUID-VkSubpassDescription2-attachment-02801"],
                    ..Default::default()
                }))?;
            } else if !format.aspects().contains(aspects) {
                report.push(Box::new(ValidationError {
                    context: "aspects".into(),
                    problem: "contains aspects that the format of the attachment does not have"
                        .into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkRenderPassCreateInfo-pNext-01963"],
                        ["VUID-VkRenderPassCreateInfo2-attachment-02525"],
                    ),
                    ..Default::default()
                }))?;
            }
        }

        Ok(())
    }

    pub(crate) fn check_resolve_pairing(
        &self,
        color_attachments: &[Option<AttachmentReference>],
        resolve_attachments: &[Option<AttachmentReference>],
        attachments: &[AttachmentDescription],
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let flavor = self.flavor;

        if resolve_attachments.is_empty() {
            return Ok(());
        }

        if resolve_attachments.len() != color_attachments.len() {
            return report.push(Box::new(ValidationError {
                problem: "`resolve_attachments` is not empty, and its length is not equal to \
                    the length of `color_attachments`"
                    .into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkSubpassDescription-pResolveAttachments-parameter"],
                    ["VUID-VkSubpassDescription2-pResolveAttachments-parameter"],
                ),
                kind: ErrorKind::Structural,
                ..Default::default()
            }));
        }

        fn used(reference: &Option<AttachmentReference>) -> Option<&AttachmentReference> {
            reference
                .as_ref()
                .filter(|reference| reference.attachment != ATTACHMENT_UNUSED)
        }

        for (index, (color, resolve)) in color_attachments
            .iter()
            .zip(resolve_attachments)
            .enumerate()
        {
            let Some(resolve) = used(resolve) else {
                continue;
            };

            let Some(color) = used(color) else {
                report.push(Box::new(ValidationError {
                    problem: format!(
                        "`resolve_attachments[{0}]` is used, but `color_attachments[{0}]` is \
                        unused",
                        index,
                    )
                    .into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkSubpassDescription-pResolveAttachments-00847"],
                        ["VUID-VkSubpassDescription2-pResolveAttachments-03065"],
                    ),
                    ..Default::default()
                }))?;
                continue;
            };

            let (Some(color_description), Some(resolve_description)) = (
                attachments.get(color.attachment as usize),
                attachments.get(resolve.attachment as usize),
            ) else {
                continue;
            };

            if color_description.samples == SampleCount::Sample1 {
                report.push(Box::new(ValidationError {
                    problem: format!(
                        "`resolve_attachments[{0}]` is used, but the attachment referred to by \
                        `color_attachments[{0}]` has a `samples` value of \
                        `SampleCount::Sample1`",
                        index,
                    )
                    .into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkSubpassDescription-pResolveAttachments-00848"],
                        ["VUID-VkSubpassDescription2-pResolveAttachments-03066"],
                    ),
                    ..Default::default()
                }))?;
            }

            if resolve_description.samples != SampleCount::Sample1 {
                report.push(Box::new(ValidationError {
                    problem: format!(
                        "the attachment referred to by `resolve_attachments[{}]` does not have \
                        a `samples` value of `SampleCount::Sample1`",
                        index,
                    )
                    .into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkSubpassDescription-pResolveAttachments-00849"],
                        ["VUID-VkSubpassDescription2-pResolveAttachments-03067"],
                    ),
                    ..Default::default()
                }))?;
            }

            if resolve_description.format != color_description.format {
                report.push(Box::new(ValidationError {
                    problem: format!(
                        "the formats of the attachments referred to by \
                        `color_attachments[{0}]` and `resolve_attachments[{0}]` are not equal",
                        index,
                    )
                    .into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkSubpassDescription-pResolveAttachments-00850"],
                        ["VUID-VkSubpassDescription2-pResolveAttachments-03068"],
                    ),
                    ..Default::default()
                }))?;
            }
        }

        Ok(())
    }

    pub(crate) fn check_subpass(
        &self,
        create_info: &RenderPassCreateInfo,
        index: usize,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let flavor = self.flavor;
        let attachments = create_info.attachments.as_slice();
        let subpass = &create_info.subpasses[index];

        if subpass.pipeline_bind_point != PipelineBindPoint::Graphics {
            report.push(Box::new(ValidationError {
                context: "pipeline_bind_point".into(),
                problem: "is not `PipelineBindPoint::Graphics`".into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkSubpassDescription-pipelineBindPoint-04952"],
                    ["VUID-VkSubpassDescription2-pipelineBindPoint-04953"],
                ),
                ..Default::default()
            }))?;
        }

        let max_color_attachments = self.capabilities.device_limit("max_color_attachments");

        if subpass.color_attachments.len() as u64 > max_color_attachments {
            report.push(Box::new(ValidationError {
                context: "color_attachments".into(),
                problem: "the length exceeds the `max_color_attachments` limit".into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkSubpassDescription-colorAttachmentCount-00845"],
                    ["VUID-VkSubpassDescription2-colorAttachmentCount-03063"],
                ),
                ..Default::default()
            }))?;
        }

        let mark = report.mark();

        for (usage, reference_index, reference) in subpass.references() {
            report.scope(usage.field(reference_index), |report| {
                self.check_reference(reference, attachments, usage, report)
            })?;
        }

        self.check_resolve_pairing(
            &subpass.color_attachments,
            &subpass.resolve_attachments,
            attachments,
            report,
        )?;

        let references_are_valid = !report.failed_since(mark);

        // Attachment index, first layout and field of every distinct attachment in the subpass.
        let mut seen: SmallVec<[(u32, ImageLayout, String); 8]> = SmallVec::new();
        let mut samples: Option<(SampleCount, String)> = None;

        for (usage, reference_index, reference) in subpass.references() {
            let Some(description) = attachments.get(reference.attachment as usize) else {
                continue;
            };
            let field = usage.field(reference_index);

            if matches!(usage, AttachmentUsage::Color | AttachmentUsage::DepthStencil) {
                if let Some((first_samples, first_field)) = &samples {
                    if *first_samples != description.samples {
                        report.push(Box::new(ValidationError {
                            problem: format!(
                                "the attachments referred to by `{}` and `{}` do not have the \
                                same `samples` value",
                                first_field, field,
                            )
                            .into(),
                            vuids: if usage == AttachmentUsage::DepthStencil {
                                &["VUID-VkSubpassDescription2-pDepthStencilAttachment-03071"]
                            } else {
                                &["VUID-VkSubpassDescription2-pColorAttachments-03069"]
                            },
                            ..Default::default()
                        }))?;
                    }
                } else {
                    samples = Some((description.samples, field.clone()));
                }
            }

            match seen
                .iter()
                .position(|(attachment, _, _)| *attachment == reference.attachment)
            {
                Some(seen_index) => {
                    let (_, first_layout, first_field) = &seen[seen_index];

                    if *first_layout != reference.layout {
                        report.push(Box::new(ValidationError {
                            context: format!("{}.layout", field).into(),
                            problem: format!(
                                "is not equal to `{}.layout`, which refers to the same \
                                attachment",
                                first_field,
                            )
                            .into(),
                            vuids: flavored!(
                                flavor,
                                ["VUID-VkSubpassDescription-layout-02519"],
                                ["VUID-VkSubpassDescription2-layout-02528"],
                            ),
                            ..Default::default()
                        }))?;
                    }
                }
                None => {
                    if references_are_valid
                        && create_info.first_use(reference.attachment) == Some(index)
                    {
                        self.check_first_use(description, reference, &field, report)?;
                    }

                    seen.push((reference.attachment, reference.layout, field));
                }
            }
        }

        for (preserve_index, &attachment) in subpass.preserve_attachments.iter().enumerate() {
            report.scope(format!("preserve_attachments[{}]", preserve_index), |report| {
                if attachment == ATTACHMENT_UNUSED {
                    report.push(Box::new(ValidationError {
                        problem: "is `ATTACHMENT_UNUSED`".into(),
                        vuids: flavored!(
                            flavor,
                            ["VUID-VkSubpassDescription-attachment-00853"],
                            ["VUID-VkSubpassDescription2-attachment-03073"],
                        ),
                        ..Default::default()
                    }))
                } else if attachment as usize >= attachments.len() {
                    report.push(Box::new(ValidationError {
                        problem: format!(
                            "is {}, which is not less than the number of attachments ({})",
                            attachment,
                            attachments.len(),
                        )
                        .into(),
                        vuids: flavored!(
                            flavor,
                            ["VUID-VkRenderPassCreateInfo-attachment-00834"],
                            ["VUID-VkRenderPassCreateInfo2-attachment-03051"],
                        ),
                        ..Default::default()
                    }))
                } else if subpass.uses_attachment(attachment) {
                    report.push(Box::new(ValidationError {
                        problem: "refers to an attachment that is also used by another \
                            attachment reference of the subpass"
                            .into(),
                        vuids: flavored!(
                            flavor,
                            ["VUID-VkSubpassDescription-pPreserveAttachments-00854"],
                            ["VUID-VkSubpassDescription2-pPreserveAttachments-03074"],
                        ),
                        ..Default::default()
                    }))
                } else {
                    Ok(())
                }
            })?;
        }

        Ok(())
    }

    /// Checks the layout of the first reference to an attachment that is cleared when it is
    /// loaded.
    fn check_first_use(
        &self,
        description: &AttachmentDescription,
        reference: &AttachmentReference,
        field: &str,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let flavor = self.flavor;
        let aspects = description.format.aspects();

        if description.load_op == LoadOp::Clear
            && aspects.intersects(ImageAspects::COLOR | ImageAspects::DEPTH)
            && is_depth_read_only(reference.layout)
        {
            report.push(Box::new(ValidationError {
                context: format!("{}.layout", field).into(),
                problem: format!(
                    "is a read-only layout, but this is the first use of attachment {}, whose \
                    `load_op` is `LoadOp::Clear`",
                    reference.attachment,
                )
                .into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkRenderPassCreateInfo-pAttachments-00836"],
                    ["VUID-VkRenderPassCreateInfo2-pAttachments-02522"],
                ),
                ..Default::default()
            }))?;
        }

        if description.stencil_load_op == LoadOp::Clear
            && aspects.intersects(ImageAspects::STENCIL)
            && is_stencil_read_only(reference.layout)
        {
            report.push(Box::new(ValidationError {
                context: format!("{}.layout", field).into(),
                problem: format!(
                    "is a read-only layout for the stencil aspect, but this is the first use of \
                    attachment {}, whose `stencil_load_op` is `LoadOp::Clear`",
                    reference.attachment,
                )
                .into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkRenderPassCreateInfo-pAttachments-02511"],
                    ["VUID-VkRenderPassCreateInfo2-pAttachments-02523"],
                ),
                ..Default::default()
            }))?;
        }

        Ok(())
    }
}

fn usage_name(usage: AttachmentUsage) -> &'static str {
    match usage {
        AttachmentUsage::Input => "input",
        AttachmentUsage::Color => "color",
        AttachmentUsage::Resolve => "resolve",
        AttachmentUsage::DepthStencil => "depth/stencil",
    }
}

fn is_depth_read_only(layout: ImageLayout) -> bool {
    matches!(
        layout,
        ImageLayout::DepthStencilReadOnlyOptimal
            | ImageLayout::ShaderReadOnlyOptimal
            | ImageLayout::DepthReadOnlyStencilAttachmentOptimal
            | ImageLayout::DepthReadOnlyOptimal
            | ImageLayout::ReadOnlyOptimal
    )
}

fn is_stencil_read_only(layout: ImageLayout) -> bool {
    matches!(
        layout,
        ImageLayout::DepthStencilReadOnlyOptimal
            | ImageLayout::ShaderReadOnlyOptimal
            | ImageLayout::DepthAttachmentStencilReadOnlyOptimal
            | ImageLayout::StencilReadOnlyOptimal
            | ImageLayout::ReadOnlyOptimal
    )
}

/// Layouts that the stencil aspect can be in when its layout is given separately.
fn is_stencil_layout(layout: ImageLayout) -> bool {
    !((layout.is_depth_stencil_specific() && !layout.is_stencil_only())
        || matches!(
            layout,
            ImageLayout::ColorAttachmentOptimal | ImageLayout::PresentSrc
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        format::Format,
        render_pass::{StencilLayoutOverride, SubpassDescription},
    };

    fn color_attachment(samples: SampleCount) -> AttachmentDescription {
        AttachmentDescription {
            format: Format::R8G8B8A8_UNORM,
            samples,
            load_op: LoadOp::Clear,
            final_layout: ImageLayout::ColorAttachmentOptimal,
            ..Default::default()
        }
    }

    fn reference(attachment: u32, layout: ImageLayout) -> AttachmentReference {
        AttachmentReference {
            attachment,
            layout,
            ..Default::default()
        }
    }

    fn collect_all(capabilities: &CapabilitySet) -> AttachmentRules<'_> {
        AttachmentRules::new(capabilities).with_mode(ValidationMode::CollectAll)
    }

    #[test]
    fn final_layout_undefined() {
        let capabilities = CapabilitySet::new();
        let description = AttachmentDescription {
            format: Format::R8G8B8A8_UNORM,
            ..Default::default()
        };

        let report = collect_all(&capabilities)
            .validate_description(&description)
            .unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkAttachmentDescription2-finalLayout-03061"],
        );
        assert_eq!(report.first().unwrap().context, "final_layout");

        let report = collect_all(&capabilities)
            .with_flavor(Flavor::V1)
            .validate_description(&description)
            .unwrap_err();
        assert!(report.contains("VUID-VkAttachmentDescription-finalLayout-00843"));
    }

    #[test]
    fn repeated_validation_agrees() {
        let capabilities = CapabilitySet::new();
        let rules = collect_all(&capabilities);
        let description = AttachmentDescription {
            format: Format::R8G8B8A8_UNORM,
            ..Default::default()
        };

        let first = rules.validate_description(&description).unwrap_err();
        let second = rules.validate_description(&description).unwrap_err();
        assert!(!first.is_empty());
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn undefined_format() {
        let capabilities = CapabilitySet::new();
        let report = collect_all(&capabilities)
            .validate_description(&AttachmentDescription {
                final_layout: ImageLayout::General,
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(report.len(), 1);
        assert_eq!(report.first().unwrap().kind(), ErrorKind::Structural);
        assert!(report.contains("VUID-VkAttachmentDescription2-format-06698"));
    }

    #[test]
    fn separate_depth_stencil_layouts() {
        let description = AttachmentDescription {
            format: Format::D24_UNORM_S8_UINT,
            initial_layout: ImageLayout::DepthAttachmentOptimal,
            final_layout: ImageLayout::DepthReadOnlyOptimal,
            stencil_layout: Some(StencilLayoutOverride {
                initial_layout: ImageLayout::StencilAttachmentOptimal,
                final_layout: ImageLayout::StencilReadOnlyOptimal,
            }),
            ..Default::default()
        };

        let capabilities = CapabilitySet::new().with_api_version(crate::Version::V1_2);
        let report = collect_all(&capabilities)
            .validate_description(&description)
            .unwrap_err();
        assert!(report.kinds().all(|kind| kind == ErrorKind::Capability));
        assert!(report.contains("VUID-VkAttachmentDescription2-separateDepthStencilLayouts-03284"));
        assert!(report.contains("VUID-VkAttachmentDescription2-separateDepthStencilLayouts-03285"));

        let capabilities = capabilities.with_feature("separate_depth_stencil_layouts");
        assert!(collect_all(&capabilities)
            .validate_description(&description)
            .is_ok());

        let report = collect_all(&capabilities)
            .validate_description(&AttachmentDescription {
                stencil_layout: None,
                ..description
            })
            .unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkAttachmentDescription2-format-06906",
                "VUID-VkAttachmentDescription2-format-06907",
            ],
        );
    }

    #[test]
    fn stencil_layout_without_stencil() {
        let capabilities = CapabilitySet::new()
            .with_api_version(crate::Version::V1_2)
            .with_feature("separate_depth_stencil_layouts");

        let report = collect_all(&capabilities)
            .validate_description(&AttachmentDescription {
                format: Format::D32_SFLOAT,
                final_layout: ImageLayout::DepthStencilAttachmentOptimal,
                stencil_layout: Some(StencilLayoutOverride {
                    initial_layout: ImageLayout::Undefined,
                    final_layout: ImageLayout::DepthAttachmentOptimal,
                }),
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "UNASSIGNED-AttachmentDescription-stencil-layout-without-stencil-aspect",
                "VUID-VkAttachmentDescriptionStencilLayout-stencilFinalLayout-03309",
            ],
        );
        assert_eq!(report.errors()[1].context, "stencil_layout.final_layout");
    }

    #[test]
    fn color_format_with_depth_layout() {
        let capabilities = CapabilitySet::new();
        let report = collect_all(&capabilities)
            .validate_description(&AttachmentDescription {
                format: Format::R8G8B8A8_UNORM,
                initial_layout: ImageLayout::DepthStencilReadOnlyOptimal,
                final_layout: ImageLayout::ColorAttachmentOptimal,
                ..Default::default()
            })
            .unwrap_err();
        assert!(report.contains("VUID-VkAttachmentDescription2-format-03280"));

        let report = collect_all(&capabilities)
            .validate_description(&AttachmentDescription {
                format: Format::D16_UNORM,
                final_layout: ImageLayout::ColorAttachmentOptimal,
                ..Default::default()
            })
            .unwrap_err();
        assert!(report.contains("VUID-VkAttachmentDescription2-format-03283"));
    }

    #[test]
    fn reference_out_of_range() {
        let capabilities = CapabilitySet::new();
        let attachments = [color_attachment(SampleCount::Sample1)];

        let report = collect_all(&capabilities)
            .validate_reference(
                &reference(3, ImageLayout::ColorAttachmentOptimal),
                &attachments,
                AttachmentUsage::Color,
            )
            .unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(report.first().unwrap().kind(), ErrorKind::Consistency);
        assert!(report.contains("VUID-VkRenderPassCreateInfo2-attachment-03051"));

        assert!(collect_all(&capabilities)
            .validate_reference(
                &reference(ATTACHMENT_UNUSED, ImageLayout::Undefined),
                &attachments,
                AttachmentUsage::Color,
            )
            .is_ok());
    }

    #[test]
    fn reference_layouts() {
        let capabilities = CapabilitySet::new();
        let rules = collect_all(&capabilities);
        let attachments = [color_attachment(SampleCount::Sample1)];

        let report = rules
            .validate_reference(
                &reference(0, ImageLayout::Undefined),
                &attachments,
                AttachmentUsage::Color,
            )
            .unwrap_err();
        assert!(report.contains("VUID-VkAttachmentReference2-layout-03077"));

        let report = rules
            .validate_reference(
                &reference(0, ImageLayout::DepthStencilAttachmentOptimal),
                &attachments,
                AttachmentUsage::Color,
            )
            .unwrap_err();
        assert!(report.contains("VUID-VkSubpassDescription2-attachment-06913"));

        assert!(rules
            .validate_reference(
                &reference(0, ImageLayout::General),
                &attachments,
                AttachmentUsage::Color,
            )
            .is_ok());

        let report = rules
            .validate_reference(
                &reference(0, ImageLayout::ColorAttachmentOptimal),
                &attachments,
                AttachmentUsage::DepthStencil,
            )
            .unwrap_err();
        assert_eq!(
            report.rule_ids().next(),
            Some("VUID-VkSubpassDescription2-attachment-06915"),
        );
        assert!(report.contains("VUID-VkSubpassDescription2-pDepthStencilAttachment-02900"));
    }

    #[test]
    fn input_aspects() {
        let capabilities = CapabilitySet::new();
        let rules = collect_all(&capabilities);
        let attachments = [color_attachment(SampleCount::Sample1)];

        let input = |aspects| AttachmentReference {
            attachment: 0,
            layout: ImageLayout::ShaderReadOnlyOptimal,
            aspects,
            ..Default::default()
        };

        for (aspects, vuid) in [
            (
                ImageAspects::empty(),
                "VUID-VkSubpassDescription2-attachment-02800",
            ),
            (
                ImageAspects::METADATA,
                "VUID-VkSubpassDescription2-attachment-02801",
            ),
            (
                ImageAspects::DEPTH,
                "VUID-VkRenderPassCreateInfo2-attachment-02525",
            ),
        ] {
            let report = rules
                .validate_reference(&input(aspects), &attachments, AttachmentUsage::Input)
                .unwrap_err();
            assert_eq!(report.rule_ids().collect::<Vec<_>>(), [vuid]);
        }

        assert!(rules
            .validate_reference(
                &input(ImageAspects::COLOR),
                &attachments,
                AttachmentUsage::Input,
            )
            .is_ok());
    }

    #[test]
    fn resolve_pairing() {
        let capabilities = CapabilitySet::new();
        let rules = collect_all(&capabilities);
        let attachments = [
            color_attachment(SampleCount::Sample4),
            color_attachment(SampleCount::Sample1),
            AttachmentDescription {
                format: Format::B8G8R8A8_UNORM,
                ..color_attachment(SampleCount::Sample4)
            },
        ];
        let color = |attachment| Some(reference(attachment, ImageLayout::ColorAttachmentOptimal));

        assert!(rules
            .validate_resolve_pairing(&[color(0)], &[color(1)], &attachments)
            .is_ok());
        assert!(rules
            .validate_resolve_pairing(&[color(0)], &[], &attachments)
            .is_ok());
        assert!(rules
            .validate_resolve_pairing(&[color(0), None], &[None, None], &attachments)
            .is_ok());

        let report = rules
            .validate_resolve_pairing(&[color(0), color(0)], &[color(1)], &attachments)
            .unwrap_err();
        assert_eq!(report.first().unwrap().kind(), ErrorKind::Structural);

        let report = rules
            .validate_resolve_pairing(&[None], &[color(1)], &attachments)
            .unwrap_err();
        assert!(report.contains("VUID-VkSubpassDescription2-pResolveAttachments-03065"));

        let report = rules
            .validate_resolve_pairing(&[color(1)], &[color(2)], &attachments)
            .unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkSubpassDescription2-pResolveAttachments-03066",
                "VUID-VkSubpassDescription2-pResolveAttachments-03067",
                "VUID-VkSubpassDescription2-pResolveAttachments-03068",
            ],
        );
    }

    #[test]
    fn conflicting_layouts_in_subpass() {
        let capabilities = CapabilitySet::new();
        let create_info = RenderPassCreateInfo {
            attachments: vec![AttachmentDescription {
                format: Format::D24_UNORM_S8_UINT,
                final_layout: ImageLayout::DepthStencilAttachmentOptimal,
                ..Default::default()
            }],
            subpasses: vec![SubpassDescription {
                input_attachments: vec![Some(AttachmentReference {
                    attachment: 0,
                    layout: ImageLayout::DepthStencilReadOnlyOptimal,
                    aspects: ImageAspects::DEPTH,
                    ..Default::default()
                })],
                depth_stencil_attachment: Some(reference(
                    0,
                    ImageLayout::DepthStencilAttachmentOptimal,
                )),
                ..Default::default()
            }],
            ..Default::default()
        };

        let report = collect_all(&capabilities)
            .validate_subpass(&create_info, 0)
            .unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkSubpassDescription2-layout-02528"],
        );
        assert_eq!(
            report.first().unwrap().context,
            "subpasses[0].input_attachments[0].layout",
        );
    }

    #[test]
    fn preserve_and_clear() {
        let capabilities = CapabilitySet::new();
        let create_info = RenderPassCreateInfo {
            attachments: vec![
                color_attachment(SampleCount::Sample1),
                color_attachment(SampleCount::Sample1),
            ],
            subpasses: vec![SubpassDescription {
                color_attachments: vec![Some(reference(0, ImageLayout::ShaderReadOnlyOptimal))],
                preserve_attachments: vec![0, 1, 2, ATTACHMENT_UNUSED],
                ..Default::default()
            }],
            ..Default::default()
        };

        let report = collect_all(&capabilities)
            .validate_subpass(&create_info, 0)
            .unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkSubpassDescription2-attachment-06913",
                "VUID-VkSubpassDescription2-attachment-06916",
                "VUID-VkAttachmentReference2-layout-03077",
                "VUID-VkSubpassDescription2-pPreserveAttachments-03074",
                "VUID-VkRenderPassCreateInfo2-attachment-03051",
                "VUID-VkSubpassDescription2-attachment-03073",
            ],
        );
    }

    #[test]
    fn clear_in_read_only_layout() {
        let capabilities = CapabilitySet::new();
        let create_info = RenderPassCreateInfo {
            attachments: vec![AttachmentDescription {
                format: Format::D32_SFLOAT,
                load_op: LoadOp::Clear,
                final_layout: ImageLayout::DepthStencilAttachmentOptimal,
                ..Default::default()
            }],
            subpasses: vec![SubpassDescription {
                depth_stencil_attachment: Some(reference(
                    0,
                    ImageLayout::DepthStencilReadOnlyOptimal,
                )),
                ..Default::default()
            }],
            ..Default::default()
        };

        let report = collect_all(&capabilities)
            .with_flavor(Flavor::V1)
            .validate_subpass(&create_info, 0)
            .unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkRenderPassCreateInfo-pAttachments-00836"],
        );
    }

    #[test]
    fn too_many_color_attachments() {
        let capabilities = CapabilitySet::new().with_limit("max_color_attachments", 1);
        let create_info = RenderPassCreateInfo {
            attachments: vec![color_attachment(SampleCount::Sample1)],
            subpasses: vec![SubpassDescription {
                color_attachments: vec![
                    Some(reference(0, ImageLayout::ColorAttachmentOptimal)),
                    None,
                ],
                ..Default::default()
            }],
            ..Default::default()
        };

        let report = AttachmentRules::new(&capabilities)
            .validate_subpass(&create_info, 0)
            .unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkSubpassDescription2-colorAttachmentCount-03063"],
        );
    }
}
