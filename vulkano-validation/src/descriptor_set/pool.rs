// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! A pool from which descriptor sets can be allocated.

use super::{
    layout::{DescriptorSetLayout, DescriptorSetLayoutCreateFlags, DescriptorType},
    DescriptorSet,
};
use crate::{report::Halt, ErrorKind, Id, ObjectGraph, ValidationError, ValidationReport};
use foldhash::HashMap;

vulkan_bitflags! {
    #[non_exhaustive]

    /// Flags specifying additional properties of a descriptor pool.
    DescriptorPoolCreateFlags = DescriptorPoolCreateFlags(u32);

    /// Individual descriptor sets can be freed from the pool. Otherwise you must reset or
    /// destroy the whole pool at once.
    FREE_DESCRIPTOR_SET = FREE_DESCRIPTOR_SET,

    /// The pool can allocate descriptor sets with a layout whose flags include
    /// [`DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL`].
    ///
    /// A pool created with this flag can still allocate descriptor sets without the flag.
    UPDATE_AFTER_BIND = UPDATE_AFTER_BIND
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_2)]),
        RequiresAllOf([DeviceExtension(ext_descriptor_indexing)]),
    ]),

    /// Descriptor sets allocated from the pool live in host memory only. They can be written
    /// and copied from, but never bound.
    HOST_ONLY = HOST_ONLY_EXT
    RequiresOneOf([
        RequiresAllOf([DeviceExtension(ext_mutable_descriptor_type)]),
        RequiresAllOf([DeviceExtension(valve_mutable_descriptor_type)]),
    ]),
}

/// Parameters to create a new `DescriptorPool`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorPoolCreateInfo {
    /// Additional properties of the descriptor pool.
    ///
    /// The default value is empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: DescriptorPoolCreateFlags,

    /// The maximum number of descriptor sets that can be allocated from the pool.
    ///
    /// The default value is `0`, which must be overridden.
    pub max_sets: u32,

    /// The number of descriptors of each type to allocate for the pool.
    ///
    /// For [`DescriptorType::InlineUniformBlock`], the number is the total number of bytes.
    ///
    /// The default value is empty, which must be overridden.
    pub pool_sizes: HashMap<DescriptorType, u32>,

    #[cfg_attr(feature = "serde", serde(skip))]
    pub _ne: crate::NonExhaustive,
}

impl Default for DescriptorPoolCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            flags: DescriptorPoolCreateFlags::empty(),
            max_sets: 0,
            pool_sizes: HashMap::default(),
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl DescriptorPoolCreateInfo {
    pub(crate) fn validate(
        &self,
        graph: &ObjectGraph,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let &Self {
            flags,
            max_sets,
            ref pool_sizes,
            _ne: _,
        } = self;

        let capabilities = graph.capabilities();

        report.check(flags.validate_capabilities(capabilities).map_err(|err| {
            err.add_context("flags")
                .set_vuids(&["VUID-VkDescriptorPoolCreateInfo-flags-parameter"])
        }))?;

        if flags.contains(
            DescriptorPoolCreateFlags::HOST_ONLY | DescriptorPoolCreateFlags::UPDATE_AFTER_BIND,
        ) {
            report.push(Box::new(ValidationError {
                context: "flags".into(),
                problem: "contains both `DescriptorPoolCreateFlags::HOST_ONLY` and \
                    `DescriptorPoolCreateFlags::UPDATE_AFTER_BIND`"
                    .into(),
                vuids: &["VUID-VkDescriptorPoolCreateInfo-flags-04607"],
                ..Default::default()
            }))?;
        }

        if max_sets == 0 {
            report.push(Box::new(ValidationError {
                context: "max_sets".into(),
                problem: "is zero".into(),
                vuids: &["VUID-VkDescriptorPoolCreateInfo-maxSets-00301"],
                ..Default::default()
            }))?;
        }

        if pool_sizes.is_empty() {
            report.push(Box::new(ValidationError {
                context: "pool_sizes".into(),
                problem: "is empty".into(),
                vuids: &["VUID-VkDescriptorPoolCreateInfo-poolSizeCount-arraylength"],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        // Iterate in a fixed order, so that collected reports are reproducible.
        let mut pool_sizes: Vec<_> = pool_sizes.iter().map(|(&ty, &count)| (ty, count)).collect();
        pool_sizes.sort_unstable_by_key(|&(ty, _)| ty as i32);

        for (descriptor_type, pool_size) in pool_sizes {
            report.check(descriptor_type.validate_capabilities(capabilities).map_err(|err| {
                err.add_context(format!("pool_sizes[DescriptorType::{:?}]", descriptor_type))
                    .set_vuids(&["VUID-VkDescriptorPoolSize-type-parameter"])
            }))?;

            if pool_size == 0 {
                report.push(Box::new(ValidationError {
                    context: format!("pool_sizes[DescriptorType::{:?}]", descriptor_type).into(),
                    problem: "is zero".into(),
                    vuids: &["VUID-VkDescriptorPoolSize-descriptorCount-00302"],
                    ..Default::default()
                }))?;
            }

            if descriptor_type == DescriptorType::InlineUniformBlock && pool_size % 4 != 0 {
                report.push(Box::new(ValidationError {
                    context: "pool_sizes[DescriptorType::InlineUniformBlock]".into(),
                    problem: "is not a multiple of 4".into(),
                    vuids: &["VUID-VkDescriptorPoolSize-type-02218"],
                    ..Default::default()
                }))?;
            }
        }

        Ok(())
    }
}

/// Parameters to allocate descriptor sets from a pool.
#[derive(Clone, Debug)]
pub struct DescriptorSetAllocateInfo {
    /// The pool to allocate from.
    ///
    /// There is no default value.
    pub descriptor_pool: Id<DescriptorPool>,

    /// The layout of each set to allocate. One set is allocated per element.
    ///
    /// The default value is empty.
    pub set_layouts: Vec<Id<DescriptorSetLayout>>,

    /// If not empty, the variable descriptor count of each set, in the same order as
    /// `set_layouts`. For layouts without a variable count binding the value is ignored.
    ///
    /// The default value is empty, which allocates every set with a variable count of zero.
    pub variable_descriptor_counts: Vec<u32>,

    pub _ne: crate::NonExhaustive,
}

impl DescriptorSetAllocateInfo {
    /// Returns a `DescriptorSetAllocateInfo` for the given pool and layouts.
    #[inline]
    pub fn new(
        descriptor_pool: Id<DescriptorPool>,
        set_layouts: impl IntoIterator<Item = Id<DescriptorSetLayout>>,
    ) -> Self {
        Self {
            descriptor_pool,
            set_layouts: set_layouts.into_iter().collect(),
            variable_descriptor_counts: Vec::new(),
            _ne: crate::NonExhaustive(()),
        }
    }

    /// Checks the allocation against the pool's remaining capacity, and returns the variable
    /// descriptor count of each set if the allocation can proceed.
    pub(crate) fn validate(
        &self,
        graph: &ObjectGraph,
        report: &mut ValidationReport,
    ) -> Result<Option<Vec<u32>>, Halt> {
        let &Self {
            descriptor_pool,
            ref set_layouts,
            ref variable_descriptor_counts,
            _ne: _,
        } = self;

        let mark = report.mark();
        let pool = graph.resolve(descriptor_pool, "descriptor_pool", report)?;

        if !variable_descriptor_counts.is_empty()
            && variable_descriptor_counts.len() != set_layouts.len()
        {
            report.push(Box::new(ValidationError {
                problem: "`variable_descriptor_counts` is not empty, but its length does not \
                    equal the length of `set_layouts`"
                    .into(),
                vuids: &[
                    "VUID-VkDescriptorSetVariableDescriptorCountAllocateInfo-descriptorSetCount-03045",
                ],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        let mut layouts = Vec::with_capacity(set_layouts.len());

        for (index, &layout) in set_layouts.iter().enumerate() {
            layouts.push(graph.resolve(layout, format!("set_layouts[{}]", index), report)?);
        }

        if report.failed_since(mark) {
            return Ok(None);
        }

        let Some(pool) = pool else {
            return Ok(None);
        };

        let mut counts = Vec::with_capacity(layouts.len());
        let mut required: HashMap<DescriptorType, u64> = HashMap::default();

        for (index, layout) in layouts.into_iter().enumerate() {
            let Some(layout) = layout else { continue };
            let variable_descriptor_count =
                variable_descriptor_counts.get(index).copied().unwrap_or(0);
            let layout_flags = layout.flags();

            if layout.has_variable_descriptor_count()
                && variable_descriptor_count > layout.variable_descriptor_count()
            {
                report.push(Box::new(ValidationError {
                    context: format!("variable_descriptor_counts[{}]", index).into(),
                    problem: format!(
                        "is greater than the maximum descriptor count {} of the variable count \
                        binding of `set_layouts[{}]`",
                        layout.variable_descriptor_count(),
                        index,
                    )
                    .into(),
                    vuids: &["VUID-VkDescriptorSetVariableDescriptorCountAllocateInfo-pSetLayouts-03046"],
                    ..Default::default()
                }))?;
            }

            if layout_flags.intersects(DescriptorSetLayoutCreateFlags::PUSH_DESCRIPTOR) {
                report.push(Box::new(ValidationError {
                    context: format!("set_layouts[{}]", index).into(),
                    problem: "was created with `DescriptorSetLayoutCreateFlags::PUSH_DESCRIPTOR`"
                        .into(),
                    vuids: &["VUID-VkDescriptorSetAllocateInfo-pSetLayouts-00308"],
                    ..Default::default()
                }))?;
            }

            if layout_flags.intersects(DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL)
                && !pool.flags.intersects(DescriptorPoolCreateFlags::UPDATE_AFTER_BIND)
            {
                report.push(Box::new(ValidationError {
                    problem: format!(
                        "`set_layouts[{}]` was created with \
                        `DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL`, but \
                        `descriptor_pool` was not created with \
                        `DescriptorPoolCreateFlags::UPDATE_AFTER_BIND`",
                        index,
                    )
                    .into(),
                    vuids: &["VUID-VkDescriptorSetAllocateInfo-pSetLayouts-03044"],
                    ..Default::default()
                }))?;
            }

            if layout_flags.intersects(DescriptorSetLayoutCreateFlags::HOST_ONLY_POOL)
                && !pool.flags.intersects(DescriptorPoolCreateFlags::HOST_ONLY)
            {
                report.push(Box::new(ValidationError {
                    problem: format!(
                        "`set_layouts[{}]` was created with \
                        `DescriptorSetLayoutCreateFlags::HOST_ONLY_POOL`, but \
                        `descriptor_pool` was not created with \
                        `DescriptorPoolCreateFlags::HOST_ONLY`",
                        index,
                    )
                    .into(),
                    vuids: &["VUID-VkDescriptorSetAllocateInfo-pSetLayouts-04610"],
                    ..Default::default()
                }))?;
            }

            let variable_descriptor_count =
                variable_descriptor_count.min(layout.variable_descriptor_count());

            for (ty, count) in layout.descriptor_counts_with_variable(variable_descriptor_count) {
                *required.entry(ty).or_default() += u64::from(count);
            }

            counts.push(variable_descriptor_count);
        }

        let remaining_sets = pool.max_sets.saturating_sub(pool.sets.len() as u32);

        if set_layouts.len() as u64 > u64::from(remaining_sets) {
            report.push(Box::new(ValidationError {
                context: "set_layouts".into(),
                problem: format!(
                    "has {} elements, but `descriptor_pool` can only allocate {} more sets",
                    set_layouts.len(),
                    remaining_sets,
                )
                .into(),
                vuids: &["VUID-VkDescriptorSetAllocateInfo-descriptorSetCount-00306"],
                kind: ErrorKind::PoolExhausted,
                ..Default::default()
            }))?;
        }

        let mut required: Vec<_> = required.into_iter().collect();
        required.sort_unstable_by_key(|&(ty, _)| ty as i32);

        for (descriptor_type, required_count) in required {
            let remaining = pool.remaining(descriptor_type);

            if required_count > u64::from(remaining) {
                report.push(Box::new(ValidationError {
                    context: "set_layouts".into(),
                    problem: format!(
                        "requires {} descriptors of type `DescriptorType::{:?}`, but \
                        `descriptor_pool` only has {} left",
                        required_count, descriptor_type, remaining,
                    )
                    .into(),
                    vuids: &["VUID-VkDescriptorSetAllocateInfo-descriptorPool-00307"],
                    kind: ErrorKind::PoolExhausted,
                    ..Default::default()
                }))?;
            }
        }

        Ok((!report.failed_since(mark)).then_some(counts))
    }
}

/// A pool from which descriptor sets can be allocated.
#[derive(Debug)]
pub struct DescriptorPool {
    flags: DescriptorPoolCreateFlags,
    max_sets: u32,
    pool_sizes: HashMap<DescriptorType, u32>,
    allocated: HashMap<DescriptorType, u32>,
    sets: Vec<Id<DescriptorSet>>,
}

impl DescriptorPool {
    pub(crate) fn new(create_info: DescriptorPoolCreateInfo) -> Self {
        let DescriptorPoolCreateInfo {
            flags,
            max_sets,
            pool_sizes,
            _ne: _,
        } = create_info;

        DescriptorPool {
            flags,
            max_sets,
            pool_sizes,
            allocated: HashMap::default(),
            sets: Vec::new(),
        }
    }

    /// Returns the flags that the pool was created with.
    #[inline]
    pub fn flags(&self) -> DescriptorPoolCreateFlags {
        self.flags
    }

    /// Returns the maximum number of sets that can be allocated from the pool.
    #[inline]
    pub fn max_sets(&self) -> u32 {
        self.max_sets
    }

    /// Returns the number of descriptors of each type that the pool was created with.
    #[inline]
    pub fn pool_sizes(&self) -> &HashMap<DescriptorType, u32> {
        &self.pool_sizes
    }

    /// Returns the number of descriptors of `descriptor_type` that can still be allocated.
    pub fn remaining(&self, descriptor_type: DescriptorType) -> u32 {
        let total = self.pool_sizes.get(&descriptor_type).copied().unwrap_or(0);
        let allocated = self.allocated.get(&descriptor_type).copied().unwrap_or(0);

        total.saturating_sub(allocated)
    }

    /// Returns the sets that are currently allocated from the pool.
    #[inline]
    pub fn allocated_sets(&self) -> &[Id<DescriptorSet>] {
        &self.sets
    }

    pub(crate) fn add_set(&mut self, set: Id<DescriptorSet>, counts: HashMap<DescriptorType, u32>) {
        for (ty, count) in counts {
            *self.allocated.entry(ty).or_default() += count;
        }

        self.sets.push(set);
    }

    pub(crate) fn remove_set(
        &mut self,
        set: Id<DescriptorSet>,
        counts: HashMap<DescriptorType, u32>,
    ) {
        for (ty, count) in counts {
            if let Some(allocated) = self.allocated.get_mut(&ty) {
                *allocated -= count;
            }
        }

        self.allocated.retain(|_, allocated| *allocated != 0);
        self.sets.retain(|&s| s != set);
    }

    /// Returns every allocation to the pool, and the sets that were allocated.
    pub(crate) fn take_sets(&mut self) -> Vec<Id<DescriptorSet>> {
        self.allocated.clear();

        std::mem::take(&mut self.sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        descriptor_set::layout::{DescriptorSetLayoutBinding, DescriptorSetLayoutCreateInfo},
        CapabilitySet, ValidationMode,
    };

    fn pool_info(max_sets: u32, sizes: &[(DescriptorType, u32)]) -> DescriptorPoolCreateInfo {
        DescriptorPoolCreateInfo {
            max_sets,
            pool_sizes: sizes.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn uniform_layout(graph: &mut ObjectGraph, count: u32) -> Id<DescriptorSetLayout> {
        graph
            .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
                bindings: vec![DescriptorSetLayoutBinding {
                    descriptor_count: count,
                    ..DescriptorSetLayoutBinding::new(0, DescriptorType::UniformBuffer)
                }],
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn create_info_rules() {
        let mut graph =
            ObjectGraph::new(CapabilitySet::new()).with_mode(ValidationMode::CollectAll);
        let report = graph
            .create_descriptor_pool(pool_info(0, &[(DescriptorType::UniformBuffer, 0)]))
            .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkDescriptorPoolCreateInfo-maxSets-00301",
                "VUID-VkDescriptorPoolSize-descriptorCount-00302",
            ],
        );

        let report = graph.create_descriptor_pool(pool_info(1, &[])).unwrap_err();
        assert!(report.contains("VUID-VkDescriptorPoolCreateInfo-poolSizeCount-arraylength"));
        assert_eq!(report.first().unwrap().kind(), ErrorKind::Structural);
    }

    #[test]
    fn exhaustion() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let layout = uniform_layout(&mut graph, 2);
        let pool = graph
            .create_descriptor_pool(pool_info(2, &[(DescriptorType::UniformBuffer, 3)]))
            .unwrap();

        let sets = graph
            .allocate_descriptor_sets(DescriptorSetAllocateInfo::new(pool, [layout]))
            .unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(graph.get(pool).unwrap().remaining(DescriptorType::UniformBuffer), 1);

        let report = graph
            .allocate_descriptor_sets(DescriptorSetAllocateInfo::new(pool, [layout]))
            .unwrap_err();
        assert!(report.contains("VUID-VkDescriptorSetAllocateInfo-descriptorPool-00307"));
        assert_eq!(report.first().unwrap().kind(), ErrorKind::PoolExhausted);

        // The failed allocation must not have taken anything.
        assert_eq!(graph.get(pool).unwrap().allocated_sets().len(), 1);
        assert_eq!(graph.get(pool).unwrap().remaining(DescriptorType::UniformBuffer), 1);
    }

    #[test]
    fn exhaustion_with_large_counts() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let layout = uniform_layout(&mut graph, 1 << 31);
        let pool = graph
            .create_descriptor_pool(pool_info(2, &[(DescriptorType::UniformBuffer, u32::MAX)]))
            .unwrap();

        // Two sets need 2^32 descriptors, one more than the pool holds.
        let report = graph
            .allocate_descriptor_sets(DescriptorSetAllocateInfo::new(pool, [layout, layout]))
            .unwrap_err();
        assert!(report.contains("VUID-VkDescriptorSetAllocateInfo-descriptorPool-00307"));
        assert_eq!(report.first().unwrap().kind(), ErrorKind::PoolExhausted);
        assert!(graph.get(pool).unwrap().allocated_sets().is_empty());
    }

    #[test]
    fn max_sets() {
        let mut graph =
            ObjectGraph::new(CapabilitySet::new()).with_mode(ValidationMode::CollectAll);
        let layout = uniform_layout(&mut graph, 1);
        let pool = graph
            .create_descriptor_pool(pool_info(1, &[(DescriptorType::UniformBuffer, 8)]))
            .unwrap();

        let report = graph
            .allocate_descriptor_sets(DescriptorSetAllocateInfo::new(pool, [layout, layout]))
            .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkDescriptorSetAllocateInfo-descriptorSetCount-00306"],
        );
    }

    #[test]
    fn reset_returns_capacity() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let layout = uniform_layout(&mut graph, 1);
        let pool = graph
            .create_descriptor_pool(pool_info(1, &[(DescriptorType::UniformBuffer, 1)]))
            .unwrap();

        let sets = graph
            .allocate_descriptor_sets(DescriptorSetAllocateInfo::new(pool, [layout]))
            .unwrap();
        graph.reset_descriptor_pool(pool).unwrap();

        assert!(graph.get(sets[0]).is_err());
        assert!(graph
            .allocate_descriptor_sets(DescriptorSetAllocateInfo::new(pool, [layout]))
            .is_ok());
    }

    #[test]
    fn free_requires_flag() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let layout = uniform_layout(&mut graph, 1);
        let pool = graph
            .create_descriptor_pool(pool_info(1, &[(DescriptorType::UniformBuffer, 1)]))
            .unwrap();
        let sets = graph
            .allocate_descriptor_sets(DescriptorSetAllocateInfo::new(pool, [layout]))
            .unwrap();

        let report = graph.free_descriptor_sets(pool, &sets).unwrap_err();
        assert!(report.contains("VUID-vkFreeDescriptorSets-descriptorPool-00312"));
    }
}
