// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use super::{Flavor, RenderPassCreateInfo, SubpassDependency, SUBPASS_EXTERNAL};
use crate::{
    capabilities::CapabilitySet,
    report::Halt,
    sync::{DependencyFlags, PipelineStages, GATED_STAGES},
    Requires, RequiresAllOf, RequiresOneOf, RuleId, ValidationError, ValidationMode,
    ValidationReport,
};
use std::collections::VecDeque;

/// The rule used for a read of an input attachment that is not ordered after the write of an
/// earlier subpass. It has no VUID; this is the identifier the Khronos synchronization
/// validation uses for the same hazard.
pub const READ_AFTER_WRITE_HAZARD: RuleId = "SYNC-HAZARD-READ-AFTER-WRITE";

/// How far the checks of one subpass dependency have progressed.
///
/// The checks of a dependency run in a fixed order: the stage masks, then the access masks,
/// then the subpass indices and everything that depends on them. A dependency that violates a
/// rule in any phase is rejected, and keeps the first rule it violated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EdgeState {
    /// No rule has been evaluated yet.
    #[default]
    Unchecked,
    /// The stage masks only contain stages that are supported and allowed.
    StageMaskChecked,
    /// The access masks only contain access types that the stage masks can perform.
    AccessMaskChecked,
    /// The subpass indices, self-dependency and view-local rules hold.
    OrderingChecked,
    /// Every rule holds.
    Accepted,
    /// The dependency violates the rule with the given ID.
    Rejected(RuleId),
}

impl EdgeState {
    /// Returns whether the dependency was rejected.
    #[inline]
    pub fn is_rejected(self) -> bool {
        matches!(self, EdgeState::Rejected(_))
    }
}

/// The rules that concern the relations between the subpasses of a render pass: the dependency
/// graph, multiview, and the order of writes and input attachment reads.
///
/// ```
/// use vulkano_validation::{
///     render_pass::{EdgeState, RenderPassCreateInfo, SubpassDependency, SubpassDescription,
///         SubpassGraphValidator},
///     sync::PipelineStages,
///     CapabilitySet, ValidationMode,
/// };
///
/// let create_info = RenderPassCreateInfo {
///     subpasses: vec![SubpassDescription::default(), SubpassDescription::default()],
///     dependencies: vec![SubpassDependency {
///         src_subpass: Some(4),
///         dst_subpass: Some(4),
///         src_stages: PipelineStages::COLOR_ATTACHMENT_OUTPUT,
///         dst_stages: PipelineStages::FRAGMENT_SHADER,
///         ..Default::default()
///     }],
///     ..Default::default()
/// };
///
/// let capabilities = CapabilitySet::new();
/// let mut validator = SubpassGraphValidator::new(&capabilities, &create_info)
///     .with_mode(ValidationMode::CollectAll);
/// let report = validator.validate_dependency(0).unwrap_err();
///
/// assert_eq!(
///     report.rule_ids().collect::<Vec<_>>(),
///     [
///         "VUID-VkRenderPassCreateInfo2-srcSubpass-02526",
///         "VUID-VkRenderPassCreateInfo2-dstSubpass-02527",
///     ],
/// );
/// assert_eq!(
///     validator.edge_state(0),
///     EdgeState::Rejected("VUID-VkRenderPassCreateInfo2-srcSubpass-02526"),
/// );
/// ```
#[derive(Debug)]
pub struct SubpassGraphValidator<'a> {
    capabilities: &'a CapabilitySet,
    create_info: &'a RenderPassCreateInfo,
    flavor: Flavor,
    mode: ValidationMode,
    edge_states: Vec<EdgeState>,
}

impl<'a> SubpassGraphValidator<'a> {
    /// Returns a validator for the dependencies of `create_info`, with every edge unchecked.
    pub fn new(capabilities: &'a CapabilitySet, create_info: &'a RenderPassCreateInfo) -> Self {
        SubpassGraphValidator {
            capabilities,
            create_info,
            flavor: Flavor::V2,
            mode: ValidationMode::FailFast,
            edge_states: vec![EdgeState::Unchecked; create_info.dependencies.len()],
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

    /// Returns the state of the dependency at index `dependency`.
    ///
    /// # Panics
    ///
    /// - Panics if `dependency` is out of range.
    #[inline]
    pub fn edge_state(&self, dependency: usize) -> EdgeState {
        self.edge_states[dependency]
    }

    /// Returns the state of every dependency.
    #[inline]
    pub fn edge_states(&self) -> &[EdgeState] {
        &self.edge_states
    }

    pub(crate) fn into_edge_states(self) -> Vec<EdgeState> {
        self.edge_states
    }

    /// Runs the checks of the dependency at index `dependency`, moving its state to
    /// [`EdgeState::Accepted`] or [`EdgeState::Rejected`].
    ///
    /// # Panics
    ///
    /// - Panics if `dependency` is out of range.
    pub fn validate_dependency(&mut self, dependency: usize) -> Result<(), ValidationReport> {
        let mode = self.mode;

        ValidationReport::run(mode, |report| {
            report.scope(format!("dependencies[{}]", dependency), |report| {
                self.check_dependency(dependency, report)
            })
        })
    }

    /// Checks the view masks of the subpasses and the correlated view masks.
    pub fn validate_multiview(&self) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| self.check_multiview(report))
    }

    /// Checks that no attachment is read as an input attachment before its contents are
    /// defined, or without being ordered after the subpass that wrote them.
    pub fn validate_input_attachment_ordering(&self) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            self.check_input_attachment_ordering(report)
        })
    }

    /// Returns whether the internal dependencies order subpass `dst` after subpass `src`,
    /// directly or through other subpasses.
    pub fn has_path(&self, src: u32, dst: u32) -> bool {
        let subpass_count = self.create_info.subpasses.len();

        if src as usize >= subpass_count || dst as usize >= subpass_count {
            return false;
        }

        let mut visited = vec![false; subpass_count];
        let mut queue = VecDeque::from([src]);
        visited[src as usize] = true;

        while let Some(current) = queue.pop_front() {
            for dependency in &self.create_info.dependencies {
                let (Some(from), Some(to)) = (
                    self.internal(dependency.src_subpass),
                    self.internal(dependency.dst_subpass),
                ) else {
                    continue;
                };

                if from != current || to <= from || visited[to as usize] {
                    continue;
                }

                if to == dst {
                    return true;
                }

                visited[to as usize] = true;
                queue.push_back(to);
            }
        }

        false
    }

    /// Returns the subpass index of a dependency endpoint, if it is in range.
    fn internal(&self, subpass: Option<u32>) -> Option<u32> {
        subpass.filter(|&subpass| (subpass as usize) < self.create_info.subpasses.len())
    }

    /// Runs one phase of the checks of a dependency and moves its state forward.
    fn step(
        &mut self,
        dependency: usize,
        next: EdgeState,
        report: &mut ValidationReport,
        phase: impl FnOnce(&Self, &SubpassDependency, &mut ValidationReport) -> Result<(), Halt>,
    ) -> Result<(), Halt> {
        let mark = report.mark();
        let result = phase(self, &self.create_info.dependencies[dependency], report);
        let state = &mut self.edge_states[dependency];

        if !state.is_rejected() {
            *state = match report.errors().get(mark) {
                Some(error) => EdgeState::Rejected(error.rule_id().unwrap_or_default()),
                None => next,
            };
        }

        result
    }

    pub(crate) fn check_dependency(
        &mut self,
        dependency: usize,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        self.edge_states[dependency] = EdgeState::Unchecked;

        self.step(
            dependency,
            EdgeState::StageMaskChecked,
            report,
            Self::check_stages,
        )?;
        self.step(
            dependency,
            EdgeState::AccessMaskChecked,
            report,
            Self::check_access,
        )?;
        self.step(
            dependency,
            EdgeState::OrderingChecked,
            report,
            Self::check_ordering,
        )?;

        if self.edge_states[dependency] == EdgeState::OrderingChecked {
            self.edge_states[dependency] = EdgeState::Accepted;
        }

        log::trace!(
            "dependency {} is {:?}",
            dependency,
            self.edge_states[dependency],
        );

        Ok(())
    }

    fn check_stages(
        &self,
        dependency: &SubpassDependency,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let flavor = self.flavor;

        for (side, field, stages, subpass) in [
            (0, "src_stages", dependency.src_stages, dependency.src_subpass),
            (1, "dst_stages", dependency.dst_stages, dependency.dst_subpass),
        ] {
            report.check(stages.validate_capabilities(self.capabilities).map_err(|err| {
                err.add_context(field).set_vuids(
                    [
                        flavored!(
                            flavor,
                            ["VUID-VkSubpassDependency-srcStageMask-parameter"],
                            ["VUID-VkSubpassDependency2-srcStageMask-parameter"],
                        ),
                        flavored!(
                            flavor,
                            ["VUID-VkSubpassDependency-dstStageMask-parameter"],
                            ["VUID-VkSubpassDependency2-dstStageMask-parameter"],
                        ),
                    ][side],
                )
            }))?;

            for gated in GATED_STAGES {
                if stages.intersects(gated.stages)
                    && !self.capabilities.satisfies(gated.requires_one_of)
                {
                    report.push(Box::new(ValidationError {
                        context: field.into(),
                        problem: format!("contains `PipelineStages::{:?}`", gated.stages).into(),
                        requires_one_of: gated.requires_one_of,
                        vuids: match flavor {
                            Flavor::V1 => gated.vuids_v1[side],
                            Flavor::V2 => gated.vuids[side],
                        },
                        ..Default::default()
                    }))?;
                }
            }

            if stages.is_empty() && !self.capabilities.is_feature_enabled("synchronization2") {
                report.push(Box::new(ValidationError {
                    context: field.into(),
                    problem: "is empty".into(),
                    requires_one_of: RequiresOneOf(&[RequiresAllOf(&[
                        Requires::DeviceFeature("synchronization2"),
                    ])]),
                    vuids: [
                        &["VUID-VkSubpassDependency2-srcStageMask-03937"] as &[_],
                        &["VUID-VkSubpassDependency2-dstStageMask-03937"],
                    ][side],
                    ..Default::default()
                }))?;
            }

            // Only stages of the graphics pipeline can run inside a render pass.
            if self.internal(subpass).is_some()
                && !PipelineStages::GRAPHICS_PIPELINE.contains(stages)
            {
                report.push(Box::new(ValidationError {
                    context: field.into(),
                    problem: "contains a stage that is not part of the graphics pipeline, but \
                        the subpass of this side of the dependency is not external"
                        .into(),
                    vuids: [
                        flavored!(
                            flavor,
                            ["VUID-VkRenderPassCreateInfo-pDependencies-00837"],
                            ["VUID-VkRenderPassCreateInfo2-pDependencies-03054"],
                        ),
                        flavored!(
                            flavor,
                            ["VUID-VkRenderPassCreateInfo-pDependencies-00838"],
                            ["VUID-VkRenderPassCreateInfo2-pDependencies-03055"],
                        ),
                    ][side],
                    ..Default::default()
                }))?;
            }
        }

        Ok(())
    }

    fn check_access(
        &self,
        dependency: &SubpassDependency,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let flavor = self.flavor;

        for (side, field, access, stages) in [
            (0, "src_access", dependency.src_access, dependency.src_stages),
            (1, "dst_access", dependency.dst_access, dependency.dst_stages),
        ] {
            report.check(access.validate_capabilities(self.capabilities).map_err(|err| {
                err.add_context(field).set_vuids(
                    [
                        flavored!(
                            flavor,
                            ["VUID-VkSubpassDependency-srcAccessMask-parameter"],
                            ["VUID-VkSubpassDependency2-srcAccessMask-parameter"],
                        ),
                        flavored!(
                            flavor,
                            ["VUID-VkSubpassDependency-dstAccessMask-parameter"],
                            ["VUID-VkSubpassDependency2-dstAccessMask-parameter"],
                        ),
                    ][side],
                )
            }))?;

            let unsupported = access - stages.supported_access();

            if !unsupported.is_empty() {
                report.push(Box::new(ValidationError {
                    context: field.into(),
                    problem: format!(
                        "contains `{:?}`, which cannot be performed by any of the stages in \
                        `{}`",
                        unsupported,
                        ["src_stages", "dst_stages"][side],
                    )
                    .into(),
                    vuids: [
                        flavored!(
                            flavor,
                            ["VUID-VkSubpassDependency-srcAccessMask-00868"],
                            ["VUID-VkSubpassDependency2-srcAccessMask-03088"],
                        ),
                        flavored!(
                            flavor,
                            ["VUID-VkSubpassDependency-dstAccessMask-00869"],
                            ["VUID-VkSubpassDependency2-dstAccessMask-03089"],
                        ),
                    ][side],
                    ..Default::default()
                }))?;
            }
        }

        Ok(())
    }

    fn check_ordering(
        &self,
        dependency: &SubpassDependency,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let flavor = self.flavor;
        let subpass_count = self.create_info.subpasses.len();
        let &SubpassDependency {
            src_subpass,
            dst_subpass,
            dependency_flags,
            view_offset,
            ..
        } = dependency;

        // An index equal to `SUBPASS_EXTERNAL` is treated the same as `None`.
        let src_subpass = src_subpass.filter(|&subpass| subpass != SUBPASS_EXTERNAL);
        let dst_subpass = dst_subpass.filter(|&subpass| subpass != SUBPASS_EXTERNAL);

        report.check(
            dependency_flags
                .validate_capabilities(self.capabilities)
                .map_err(|err| {
                    err.add_context("dependency_flags").set_vuids(flavored!(
                        flavor,
                        ["VUID-VkSubpassDependency-dependencyFlags-parameter"],
                        ["VUID-VkSubpassDependency2-dependencyFlags-parameter"],
                    ))
                }),
        )?;

        let mut endpoints_are_valid = true;

        if let Some(src_subpass) = src_subpass.filter(|&s| s as usize >= subpass_count) {
            endpoints_are_valid = false;
            report.push(Box::new(ValidationError {
                context: "src_subpass".into(),
                problem: format!(
                    "is {}, which is not less than the number of subpasses ({})",
                    src_subpass, subpass_count,
                )
                .into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkRenderPassCreateInfo-srcSubpass-02517"],
                    ["VUID-VkRenderPassCreateInfo2-srcSubpass-02526"],
                ),
                ..Default::default()
            }))?;
        }

        if let Some(dst_subpass) = dst_subpass.filter(|&s| s as usize >= subpass_count) {
            endpoints_are_valid = false;
            report.push(Box::new(ValidationError {
                context: "dst_subpass".into(),
                problem: format!(
                    "is {}, which is not less than the number of subpasses ({})",
                    dst_subpass, subpass_count,
                )
                .into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkRenderPassCreateInfo-dstSubpass-02518"],
                    ["VUID-VkRenderPassCreateInfo2-dstSubpass-02527"],
                ),
                ..Default::default()
            }))?;
        }

        let is_view_local = dependency_flags.intersects(DependencyFlags::VIEW_LOCAL);

        match (src_subpass, dst_subpass) {
            (None, None) => {
                report.push(Box::new(ValidationError {
                    problem: "`src_subpass` and `dst_subpass` are both external".into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkSubpassDependency-srcSubpass-00865"],
                        ["VUID-VkSubpassDependency2-srcSubpass-03085"],
                    ),
                    ..Default::default()
                }))?;
            }
            (Some(src), Some(dst)) if src > dst => {
                report.push(Box::new(ValidationError {
                    problem: "`src_subpass` is greater than `dst_subpass`".into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkSubpassDependency-srcSubpass-00864"],
                        ["VUID-VkSubpassDependency2-srcSubpass-03084"],
                    ),
                    ..Default::default()
                }))?;
            }
            (Some(src), Some(dst)) if src == dst && endpoints_are_valid => {
                self.check_self_dependency(dependency, src, report)?;
            }
            _ => (),
        }

        if is_view_local {
            if src_subpass.is_none() {
                report.push(Box::new(ValidationError {
                    problem: "`dependency_flags` contains `DependencyFlags::VIEW_LOCAL`, but \
                        `src_subpass` is external"
                        .into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkSubpassDependency-dependencyFlags-02520"],
                        ["VUID-VkSubpassDependency2-dependencyFlags-03090"],
                    ),
                    ..Default::default()
                }))?;
            }

            if dst_subpass.is_none() {
                report.push(Box::new(ValidationError {
                    problem: "`dependency_flags` contains `DependencyFlags::VIEW_LOCAL`, but \
                        `dst_subpass` is external"
                        .into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkSubpassDependency-dependencyFlags-02521"],
                        ["VUID-VkSubpassDependency2-dependencyFlags-03091"],
                    ),
                    ..Default::default()
                }))?;
            }

            if !self.is_multiview() {
                report.push(Box::new(ValidationError {
                    problem: "`dependency_flags` contains `DependencyFlags::VIEW_LOCAL`, but \
                        the subpasses do not use multiview"
                        .into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkRenderPassCreateInfo-pNext-02514"],
                        ["VUID-VkRenderPassCreateInfo2-viewMask-03059"],
                    ),
                    ..Default::default()
                }))?;
            }
        } else if view_offset != 0 {
            report.push(Box::new(ValidationError {
                context: "view_offset".into(),
                problem: "is not zero, but `dependency_flags` does not contain \
                    `DependencyFlags::VIEW_LOCAL`"
                    .into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkRenderPassCreateInfo-pNext-02512"],
                    ["VUID-VkSubpassDependency2-dependencyFlags-03092"],
                ),
                ..Default::default()
            }))?;
        }

        Ok(())
    }

    fn check_self_dependency(
        &self,
        dependency: &SubpassDependency,
        subpass: u32,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let flavor = self.flavor;
        let &SubpassDependency {
            src_stages,
            dst_stages,
            dependency_flags,
            view_offset,
            ..
        } = dependency;

        let by_region = dependency_flags.intersects(DependencyFlags::BY_REGION);
        let framebuffer_only =
            src_stages.is_framebuffer_space() && dst_stages.is_framebuffer_space();

        if !(by_region && framebuffer_only) {
            if let (Some((_, src_latest)), Some((dst_earliest, _))) = (
                src_stages.logical_order_bounds(),
                dst_stages.logical_order_bounds(),
            ) {
                if src_latest > dst_earliest {
                    report.push(Box::new(ValidationError {
                        problem: "`src_subpass` is equal to `dst_subpass`, but the logically \
                            latest stage in `src_stages` is later than the logically earliest \
                            stage in `dst_stages`"
                            .into(),
                        vuids: flavored!(
                            flavor,
                            ["VUID-VkSubpassDependency-srcSubpass-00867"],
                            ["VUID-VkSubpassDependency2-srcSubpass-03087"],
                        ),
                        ..Default::default()
                    }))?;
                }
            }
        }

        let src_framebuffer = (src_stages.expand()).intersects(PipelineStages::FRAMEBUFFER_SPACE);
        let dst_framebuffer = (dst_stages.expand()).intersects(PipelineStages::FRAMEBUFFER_SPACE);

        if src_framebuffer && dst_framebuffer {
            if !framebuffer_only {
                report.push(Box::new(ValidationError {
                    problem: "`src_subpass` is equal to `dst_subpass`, and `src_stages` and \
                        `dst_stages` both contain a framebuffer-space stage, but they also \
                        contain stages that are not framebuffer-space stages"
                        .into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkSubpassDependency-srcSubpass-06809"],
                        ["VUID-VkSubpassDependency2-srcSubpass-06810"],
                    ),
                    ..Default::default()
                }))?;
            }

            if !by_region {
                report.push(Box::new(ValidationError {
                    problem: "`src_subpass` is equal to `dst_subpass`, and `src_stages` and \
                        `dst_stages` both contain a framebuffer-space stage, but \
                        `dependency_flags` does not contain `DependencyFlags::BY_REGION`"
                        .into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkSubpassDependency-srcSubpass-02243"],
                        ["VUID-VkSubpassDependency2-srcSubpass-02245"],
                    ),
                    ..Default::default()
                }))?;
            }
        }

        let view_mask = self.create_info.subpasses[subpass as usize].view_mask;

        if view_mask.count_ones() > 1 && !dependency_flags.intersects(DependencyFlags::VIEW_LOCAL)
        {
            report.push(Box::new(ValidationError {
                problem: "`src_subpass` is equal to `dst_subpass`, and the `view_mask` of the \
                    subpass has more than one bit set, but `dependency_flags` does not contain \
                    `DependencyFlags::VIEW_LOCAL`"
                    .into(),
                vuids: &["VUID-VkRenderPassCreateInfo2-pDependencies-03060"],
                ..Default::default()
            }))?;
        }

        if dependency_flags.intersects(DependencyFlags::VIEW_LOCAL) && view_offset != 0 {
            report.push(Box::new(ValidationError {
                context: "view_offset".into(),
                problem: "is not zero, but `src_subpass` is equal to `dst_subpass` and \
                    `dependency_flags` contains `DependencyFlags::VIEW_LOCAL`"
                    .into(),
                vuids: &["VUID-VkSubpassDependency2-viewOffset-02530"],
                ..Default::default()
            }))?;
        }

        Ok(())
    }

    fn is_multiview(&self) -> bool {
        (self.create_info.subpasses.iter()).any(|subpass| subpass.view_mask != 0)
    }

    pub(crate) fn check_multiview(&self, report: &mut ValidationReport) -> Result<(), Halt> {
        let flavor = self.flavor;
        let subpasses = &self.create_info.subpasses;
        let correlated_view_masks = &self.create_info.correlated_view_masks;
        let is_multiview = self.is_multiview();

        if is_multiview {
            if subpasses.iter().any(|subpass| subpass.view_mask == 0) {
                report.push(Box::new(ValidationError {
                    context: "subpasses".into(),
                    problem: "the `view_mask` of some subpasses is zero, while for others it is \
                        not"
                        .into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkRenderPassCreateInfo-pNext-02513"],
                        ["VUID-VkRenderPassCreateInfo2-viewMask-03058"],
                    ),
                    ..Default::default()
                }))?;
            }

            if !self.capabilities.is_feature_enabled("multiview") {
                report.push(Box::new(ValidationError {
                    context: "subpasses".into(),
                    problem: "the `view_mask` of a subpass is not zero".into(),
                    requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                        "multiview",
                    )])]),
                    vuids: &["VUID-VkSubpassDescription2-multiview-06558"],
                    ..Default::default()
                }))?;
            }

            let max_multiview_view_count =
                self.capabilities.device_limit("max_multiview_view_count");

            for (index, subpass) in subpasses.iter().enumerate() {
                let view_count = u32::BITS - subpass.view_mask.leading_zeros();

                if u64::from(view_count) > max_multiview_view_count {
                    report.push(Box::new(ValidationError {
                        context: format!("subpasses[{}].view_mask", index).into(),
                        problem: "the highest bit set is not less than the \
                            `max_multiview_view_count` limit"
                            .into(),
                        vuids: &["VUID-VkSubpassDescription2-viewMask-06706"],
                        ..Default::default()
                    }))?;
                }
            }
        } else if !correlated_view_masks.is_empty() {
            report.push(Box::new(ValidationError {
                context: "correlated_view_masks".into(),
                problem: "is not empty, but the subpasses do not use multiview".into(),
                vuids: flavored!(
                    flavor,
                    ["VUID-VkRenderPassCreateInfo-pNext-02515"],
                    ["VUID-VkRenderPassCreateInfo2-viewMask-03057"],
                ),
                ..Default::default()
            }))?;
        }

        let mut seen = 0u32;

        for (index, &mask) in correlated_view_masks.iter().enumerate() {
            if seen & mask != 0 {
                report.push(Box::new(ValidationError {
                    context: format!("correlated_view_masks[{}]", index).into(),
                    problem: "has a bit in common with an earlier element".into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkRenderPassMultiviewCreateInfo-pCorrelationMasks-00841"],
                        ["VUID-VkRenderPassCreateInfo2-pCorrelatedViewMasks-03056"],
                    ),
                    ..Default::default()
                }))?;
            }

            seen |= mask;
        }

        Ok(())
    }

    pub(crate) fn check_input_attachment_ordering(
        &self,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let flavor = self.flavor;
        let create_info = self.create_info;

        for (attachment, description) in create_info.attachments.iter().enumerate() {
            let attachment = attachment as u32;

            let Some(first_use) = create_info.first_use(attachment) else {
                continue;
            };

            if description.clears() && create_info.subpasses[first_use].reads_input(attachment) {
                report.push(Box::new(ValidationError {
                    context: format!("subpasses[{}].input_attachments", first_use).into(),
                    problem: format!(
                        "attachment {} is cleared when it is loaded, but it is read as an input \
                        attachment in the first subpass that uses it",
                        attachment,
                    )
                    .into(),
                    vuids: flavored!(
                        flavor,
                        ["VUID-VkSubpassDescription-loadOp-00846"],
                        ["VUID-VkSubpassDescription2-loadOp-03064"],
                    ),
                    ..Default::default()
                }))?;
            }

            for (reader, subpass) in create_info.subpasses.iter().enumerate().skip(first_use) {
                if !subpass.reads_input(attachment) {
                    continue;
                }

                let Some(writer) = create_info.subpasses[..reader]
                    .iter()
                    .rposition(|subpass| subpass.writes_attachment(attachment))
                else {
                    continue;
                };

                if !self.has_path(writer as u32, reader as u32) {
                    report.push(Box::new(ValidationError {
                        context: format!("subpasses[{}].input_attachments", reader).into(),
                        problem: format!(
                            "attachment {} is read as an input attachment, but no dependency \
                            orders this subpass after subpass {}, which writes to it",
                            attachment, writer,
                        )
                        .into(),
                        vuids: &[READ_AFTER_WRITE_HAZARD],
                        ..Default::default()
                    }))?;
                }
            }
        }

        Ok(())
    }
}
