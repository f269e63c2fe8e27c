// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The registry of every object that passed validation.

use crate::{
    buffer::{Buffer, BufferCreateInfo, BufferView, BufferViewCreateInfo},
    capabilities::CapabilitySet,
    descriptor_set::{
        CopyDescriptorSet, DescriptorPool, DescriptorPoolCreateFlags, DescriptorPoolCreateInfo,
        DescriptorRules, DescriptorSet, DescriptorSetAllocateInfo, DescriptorSetLayout,
        DescriptorSetLayoutCreateInfo, WriteDescriptorSet,
    },
    framebuffer::{Framebuffer, FramebufferCreateInfo},
    image::{Image, ImageCreateInfo, ImageView, ImageViewCreateInfo},
    lifetime::{self, CommandSequence, LifetimeTracker, ResourceState, SequenceState},
    render_pass::{
        legacy::{RenderPassDescriptorV1, RenderPassDescriptorV2},
        Flavor, RenderPass, RenderPassCreateInfo,
    },
    report::Halt,
    sampler::{Sampler, SamplerCreateInfo},
    slotmap::{SlotId, SlotMap},
    ErrorKind, ValidationError, ValidationMode, ValidationReport,
};
use parking_lot::{Mutex, MutexGuard};
use std::{
    borrow::Cow,
    cmp,
    error::Error,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// Rule ID of a handle that does not refer to an object of the graph.
pub const INVALID_HANDLE: &str = "UNASSIGNED-ObjectGraph-invalid-handle";

/// Owns the records of every object that passed validation, and the state of the command
/// sequences that refer to them.
///
/// Every mutating method validates first, and only changes the graph when no rule was violated.
/// A failed call leaves the graph exactly as it was.
#[derive(Debug)]
pub struct ObjectGraph {
    capabilities: CapabilitySet,
    mode: ValidationMode,
    buffers: SlotMap<Buffer>,
    buffer_views: SlotMap<BufferView>,
    images: SlotMap<Image>,
    image_views: SlotMap<ImageView>,
    samplers: SlotMap<Sampler>,
    render_passes: SlotMap<RenderPass>,
    framebuffers: SlotMap<Framebuffer>,
    descriptor_set_layouts: SlotMap<DescriptorSetLayout>,
    descriptor_pools: SlotMap<DescriptorPool>,
    descriptor_sets: SlotMap<DescriptorSet>,
    lifetime: LifetimeTracker,
}

impl ObjectGraph {
    /// Creates an empty graph that validates against `capabilities`, in fail-fast mode.
    pub fn new(capabilities: CapabilitySet) -> Self {
        ObjectGraph {
            capabilities,
            mode: ValidationMode::FailFast,
            buffers: SlotMap::new(),
            buffer_views: SlotMap::new(),
            images: SlotMap::new(),
            image_views: SlotMap::new(),
            samplers: SlotMap::new(),
            render_passes: SlotMap::new(),
            framebuffers: SlotMap::new(),
            descriptor_set_layouts: SlotMap::new(),
            descriptor_pools: SlotMap::new(),
            descriptor_sets: SlotMap::new(),
            lifetime: LifetimeTracker::new(),
        }
    }

    /// Sets the validation mode used by every method of the graph.
    #[inline]
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self.lifetime.set_mode(mode);
        self
    }

    /// Returns the capabilities the graph validates against.
    #[inline]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Returns the validation mode of the graph.
    #[inline]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Returns the tracker of command sequences and the objects they refer to.
    #[inline]
    pub fn lifetime(&self) -> &LifetimeTracker {
        &self.lifetime
    }

    /// Returns the object with the given ID.
    #[inline]
    pub fn get<O: Object>(&self, id: Id<O>) -> Result<&O, InvalidSlotError> {
        O::lookup(self, id).ok_or_else(|| InvalidSlotError::new(id))
    }

    /// Returns whether `id` refers to an object of the graph.
    pub fn contains(&self, id: ObjectId) -> bool {
        let slot = id.slot;

        match id.object_type() {
            ObjectType::Buffer => self.buffers.contains(slot),
            ObjectType::BufferView => self.buffer_views.contains(slot),
            ObjectType::Image => self.images.contains(slot),
            ObjectType::ImageView => self.image_views.contains(slot),
            ObjectType::Sampler => self.samplers.contains(slot),
            ObjectType::RenderPass => self.render_passes.contains(slot),
            ObjectType::Framebuffer => self.framebuffers.contains(slot),
            ObjectType::DescriptorSetLayout => self.descriptor_set_layouts.contains(slot),
            ObjectType::DescriptorPool => self.descriptor_pools.contains(slot),
            ObjectType::DescriptorSet => self.descriptor_sets.contains(slot),
            ObjectType::CommandSequence => self.lifetime.sequence(Id::new(slot)).is_ok(),
        }
    }

    /// Looks up `id` inside a validation run. A handle that doesn't resolve is reported, as a
    /// dangling reference if the object was destroyed and as a structural error otherwise.
    pub(crate) fn resolve<O: Object>(
        &self,
        id: Id<O>,
        context: impl Into<Cow<'static, str>>,
        report: &mut ValidationReport,
    ) -> Result<Option<&O>, Halt> {
        if let Some(object) = O::lookup(self, id) {
            return Ok(Some(object));
        }

        let error = if self.lifetime.is_destroyed(id.erase()) {
            lifetime::dangling_reference(id.erase())
        } else {
            invalid_handle(id)
        };

        report.push(error.add_context(context))?;

        Ok(None)
    }

    /// Creates a buffer.
    pub fn create_buffer(
        &mut self,
        create_info: BufferCreateInfo,
    ) -> Result<Id<Buffer>, ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            report.scope("create_info", |report| create_info.validate(report))
        })?;

        Ok(self.insert(Buffer::new(&create_info)))
    }

    /// Creates a view of a buffer.
    pub fn create_buffer_view(
        &mut self,
        create_info: BufferViewCreateInfo,
    ) -> Result<Id<BufferView>, ValidationReport> {
        let buffer_view = ValidationReport::evaluate(self.mode, |report| {
            report.scope("create_info", |report| {
                let Some(buffer) = self.resolve(create_info.buffer, "buffer", report)? else {
                    return Err(Halt);
                };

                create_info.validate(&self.capabilities, buffer, report)?;

                Ok(BufferView::new(&create_info, buffer))
            })
        })?;

        Ok(self.insert(buffer_view))
    }

    /// Creates an image.
    pub fn create_image(
        &mut self,
        create_info: ImageCreateInfo,
    ) -> Result<Id<Image>, ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            report.scope("create_info", |report| {
                create_info.validate(&self.capabilities, report)
            })
        })?;

        Ok(self.insert(Image::new(&create_info)))
    }

    /// Creates a view of an image.
    pub fn create_image_view(
        &mut self,
        create_info: ImageViewCreateInfo,
    ) -> Result<Id<ImageView>, ValidationReport> {
        let image_view = ValidationReport::evaluate(self.mode, |report| {
            report.scope("create_info", |report| {
                let Some(image) = self.resolve(create_info.image, "image", report)? else {
                    return Err(Halt);
                };

                create_info.validate(&self.capabilities, image, report)?;

                Ok(ImageView::new(&create_info, image))
            })
        })?;

        Ok(self.insert(image_view))
    }

    /// Creates a sampler.
    pub fn create_sampler(
        &mut self,
        create_info: SamplerCreateInfo,
    ) -> Result<Id<Sampler>, ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            report.scope("create_info", |report| {
                create_info.validate(&self.capabilities, report)
            })
        })?;

        Ok(self.insert(Sampler::new(&create_info)))
    }

    /// Creates a render pass from its canonical description. Rules report the VUIDs of
    /// `VkRenderPassCreateInfo2`.
    pub fn create_render_pass(
        &mut self,
        create_info: RenderPassCreateInfo,
    ) -> Result<Id<RenderPass>, ValidationReport> {
        self.create_render_pass_with_flavor(create_info, Flavor::V2)
    }

    /// Creates a render pass from the `VkRenderPassCreateInfo` format.
    pub fn create_render_pass_v1(
        &mut self,
        descriptor: &RenderPassDescriptorV1,
    ) -> Result<Id<RenderPass>, ValidationReport> {
        let (create_info, edge_states) = ValidationReport::evaluate(self.mode, |report| {
            report.scope("create_info", |report| {
                let mark = report.mark();
                let create_info = descriptor.check_lift(report)?;

                // The rules can't be run on a description that doesn't lift cleanly.
                if report.failed_since(mark) {
                    return Err(Halt);
                }

                let edge_states = create_info.validate(&self.capabilities, Flavor::V1, report)?;

                Ok((create_info, edge_states))
            })
        })?;

        Ok(self.insert(RenderPass::new(create_info, Flavor::V1, edge_states)))
    }

    /// Creates a render pass from the `VkRenderPassCreateInfo2` format.
    pub fn create_render_pass_v2(
        &mut self,
        descriptor: &RenderPassDescriptorV2,
    ) -> Result<Id<RenderPass>, ValidationReport> {
        self.create_render_pass_with_flavor(descriptor.into(), Flavor::V2)
    }

    fn create_render_pass_with_flavor(
        &mut self,
        create_info: RenderPassCreateInfo,
        flavor: Flavor,
    ) -> Result<Id<RenderPass>, ValidationReport> {
        let edge_states = ValidationReport::evaluate(self.mode, |report| {
            report.scope("create_info", |report| {
                create_info.validate(&self.capabilities, flavor, report)
            })
        })?;

        Ok(self.insert(RenderPass::new(create_info, flavor, edge_states)))
    }

    /// Creates a framebuffer for a render pass.
    pub fn create_framebuffer(
        &mut self,
        create_info: FramebufferCreateInfo,
    ) -> Result<Id<Framebuffer>, ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            report.scope("create_info", |report| create_info.validate(self, report))
        })?;

        Ok(self.insert(Framebuffer::new(create_info)))
    }

    /// Creates a descriptor set layout.
    pub fn create_descriptor_set_layout(
        &mut self,
        create_info: DescriptorSetLayoutCreateInfo,
    ) -> Result<Id<DescriptorSetLayout>, ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            report.scope("create_info", |report| create_info.validate(self, report))
        })?;

        Ok(self.insert(DescriptorSetLayout::new(create_info)))
    }

    /// Creates a descriptor pool.
    pub fn create_descriptor_pool(
        &mut self,
        create_info: DescriptorPoolCreateInfo,
    ) -> Result<Id<DescriptorPool>, ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            report.scope("create_info", |report| create_info.validate(self, report))
        })?;

        Ok(self.insert(DescriptorPool::new(create_info)))
    }

    /// Allocates one descriptor set for each layout of `allocate_info`. Either every set is
    /// allocated, or none is.
    pub fn allocate_descriptor_sets(
        &mut self,
        allocate_info: DescriptorSetAllocateInfo,
    ) -> Result<Vec<Id<DescriptorSet>>, ValidationReport> {
        let variable_descriptor_counts = ValidationReport::evaluate(self.mode, |report| {
            report.scope("allocate_info", |report| {
                allocate_info.validate(self, report)?.ok_or(Halt)
            })
        })?;

        let descriptor_pool = allocate_info.descriptor_pool;
        let mut ids = Vec::with_capacity(variable_descriptor_counts.len());

        for (&layout_id, variable_descriptor_count) in
            (allocate_info.set_layouts.iter()).zip(variable_descriptor_counts)
        {
            let (Some(layout), Some(pool)) = (
                self.descriptor_set_layouts.get(layout_id.slot),
                self.descriptor_pools.get(descriptor_pool.slot),
            ) else {
                continue;
            };

            let set = DescriptorSet::new(
                layout_id,
                layout,
                descriptor_pool,
                pool,
                variable_descriptor_count,
            );
            let counts = set.descriptor_counts().clone();
            let id = self.insert(set);

            if let Some(pool) = self.descriptor_pools.get_mut(descriptor_pool.slot) {
                pool.add_set(id, counts);
            }

            ids.push(id);
        }

        Ok(ids)
    }

    /// Frees descriptor sets, returning their descriptors to `descriptor_pool`.
    pub fn free_descriptor_sets(
        &mut self,
        descriptor_pool: Id<DescriptorPool>,
        descriptor_sets: &[Id<DescriptorSet>],
    ) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            if let Some(pool) = self.resolve(descriptor_pool, "descriptor_pool", report)? {
                if !pool
                    .flags()
                    .intersects(DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
                {
                    report.push(Box::new(ValidationError {
                        context: "descriptor_pool.flags".into(),
                        problem: "does not contain \
                            `DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET`"
                            .into(),
                        vuids: &["VUID-vkFreeDescriptorSets-descriptorPool-00312"],
                        ..Default::default()
                    }))?;
                }
            }

            for (index, &set_id) in descriptor_sets.iter().enumerate() {
                report.scope(format!("descriptor_sets[{}]", index), |report| {
                    let Some(set) = self.resolve(set_id, "", report)? else {
                        return Ok(());
                    };

                    if set.pool() != descriptor_pool {
                        report.push(Box::new(ValidationError {
                            problem: "was not allocated from `descriptor_pool`".into(),
                            vuids: &["VUID-vkFreeDescriptorSets-pDescriptorSets-parent"],
                            kind: ErrorKind::Structural,
                            ..Default::default()
                        }))?;
                    }

                    self.lifetime.check_destroy(set_id.erase(), "", report)
                })?;
            }

            Ok(())
        })?;

        for &set_id in descriptor_sets {
            let Some(set) = self.descriptor_sets.remove(set_id.slot) else {
                continue;
            };

            if let Some(pool) = self.descriptor_pools.get_mut(descriptor_pool.slot) {
                pool.remove_set(set_id, set.descriptor_counts().clone());
            }

            self.lifetime.mark_destroyed(set_id.erase());
            log::trace!("freed {:?}", set_id);
        }

        Ok(())
    }

    /// Returns every descriptor set of `descriptor_pool` to it. Sets that a recording or
    /// executable command sequence refers to are destroyed, and those sequences are invalidated.
    pub fn reset_descriptor_pool(
        &mut self,
        descriptor_pool: Id<DescriptorPool>,
    ) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            self.check_pool_not_in_flight(
                descriptor_pool,
                &["VUID-vkResetDescriptorPool-descriptorPool-00313"],
                report,
            )
        })?;

        self.release_pool_sets(descriptor_pool);
        log::debug!("reset {:?}", descriptor_pool);

        Ok(())
    }

    fn check_pool_not_in_flight(
        &self,
        descriptor_pool: Id<DescriptorPool>,
        vuids: &'static [&'static str],
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let Some(pool) = self.resolve(descriptor_pool, "descriptor_pool", report)? else {
            return Ok(());
        };

        for &set in pool.allocated_sets() {
            if self.lifetime.resource_state(set.erase()) == ResourceState::ReferencedByInFlight {
                report.push(Box::new(ValidationError {
                    context: "descriptor_pool".into(),
                    problem: format!(
                        "has a descriptor set ({:?}) that a pending command sequence refers to",
                        set,
                    )
                    .into(),
                    vuids,
                    kind: ErrorKind::ResourceInUse,
                    ..Default::default()
                }))?;
            }
        }

        Ok(())
    }

    fn release_pool_sets(&mut self, descriptor_pool: Id<DescriptorPool>) {
        let Some(pool) = self.descriptor_pools.get_mut(descriptor_pool.slot) else {
            return;
        };

        for set in pool.take_sets() {
            self.descriptor_sets.remove(set.slot);
            self.lifetime.force_destroy(set.erase());
        }
    }

    /// Applies descriptor writes, then descriptor copies. Either every update is applied, or
    /// none is.
    pub fn update_descriptor_sets(
        &mut self,
        descriptor_writes: &[WriteDescriptorSet],
        descriptor_copies: &[CopyDescriptorSet],
    ) -> Result<(), ValidationReport> {
        let rules = DescriptorRules::new(self);
        let (writes, copies) = ValidationReport::evaluate(self.mode, |report| {
            let mut writes = Vec::with_capacity(descriptor_writes.len());
            let mut copies = Vec::with_capacity(descriptor_copies.len());

            for (index, write) in descriptor_writes.iter().enumerate() {
                writes.extend(report.scope(format!("descriptor_writes[{}]", index), |report| {
                    rules.check_write(write, report)
                })?);
            }

            for (index, copy) in descriptor_copies.iter().enumerate() {
                copies.extend(report.scope(format!("descriptor_copies[{}]", index), |report| {
                    rules.check_copy(copy, report)
                })?);
            }

            Ok((writes, copies))
        })?;

        for write in writes {
            let objects = self.expand_all(
                (write.descriptors.iter().flatten()).flat_map(|descriptor| {
                    descriptor.referenced_objects()
                }),
            );

            if let Some(set) = self.descriptor_sets.get_mut(write.dst_set.slot) {
                set.write_slots(write.first_slot, write.descriptors);
            }

            self.lifetime
                .add_references_to_users(write.dst_set.erase(), &objects);
        }

        for copy in copies {
            let Some(src) = self.descriptor_sets.get(copy.src_set.slot) else {
                continue;
            };
            let descriptors = src.slots(copy.src_slots).to_vec();
            let objects = self.expand_all(
                (descriptors.iter().flatten()).flat_map(|descriptor| {
                    descriptor.referenced_objects()
                }),
            );

            if let Some(dst) = self.descriptor_sets.get_mut(copy.dst_set.slot) {
                dst.write_slots(copy.dst_first_slot, descriptors);
            }

            self.lifetime
                .add_references_to_users(copy.dst_set.erase(), &objects);
        }

        Ok(())
    }

    /// Destroys an object.
    ///
    /// Destroying a descriptor set frees it, and destroying a command sequence frees it.
    /// Destroying a descriptor pool destroys every set allocated from it, as a reset of the pool
    /// would.
    pub fn destroy<O: Object>(&mut self, id: Id<O>) -> Result<(), ValidationReport> {
        match O::TYPE {
            ObjectType::DescriptorSet => {
                let id = Id::<DescriptorSet>::new(id.slot);
                let pool = ValidationReport::evaluate(self.mode, |report| {
                    Ok(self.resolve(id, "descriptor_set", report)?.map(DescriptorSet::pool))
                })?;

                match pool {
                    Some(pool) => self.free_descriptor_sets(pool, &[id]),
                    None => Ok(()),
                }
            }
            ObjectType::DescriptorPool => {
                let id = Id::<DescriptorPool>::new(id.slot);
                ValidationReport::run(self.mode, |report| {
                    self.check_pool_not_in_flight(
                        id,
                        &["VUID-vkDestroyDescriptorPool-descriptorPool-00303"],
                        report,
                    )
                })?;

                self.release_pool_sets(id);
                self.descriptor_pools.remove(id.slot);
                self.lifetime.mark_destroyed(id.erase());
                log::trace!("destroyed {:?}", id);

                Ok(())
            }
            ObjectType::CommandSequence => self.lifetime.free_sequence(Id::new(id.slot)),
            object_type => {
                let object = id.erase();
                ValidationReport::run(self.mode, |report| {
                    if !self.contains(object) {
                        let error = if self.lifetime.is_destroyed(object) {
                            lifetime::dangling_reference(object)
                        } else {
                            invalid_handle(id)
                        };

                        return report.push(error);
                    }

                    self.lifetime.check_destroy(object, "", report)
                })?;

                let slot = id.slot;

                match object_type {
                    ObjectType::Buffer => self.buffers.remove(slot).map(drop),
                    ObjectType::BufferView => self.buffer_views.remove(slot).map(drop),
                    ObjectType::Image => self.images.remove(slot).map(drop),
                    ObjectType::ImageView => self.image_views.remove(slot).map(drop),
                    ObjectType::Sampler => self.samplers.remove(slot).map(drop),
                    ObjectType::RenderPass => self.render_passes.remove(slot).map(drop),
                    ObjectType::Framebuffer => self.framebuffers.remove(slot).map(drop),
                    ObjectType::DescriptorSetLayout => {
                        self.descriptor_set_layouts.remove(slot).map(drop)
                    }
                    ObjectType::DescriptorSet
                    | ObjectType::DescriptorPool
                    | ObjectType::CommandSequence => None,
                };

                self.lifetime.mark_destroyed(object);
                log::trace!("destroyed {:?} {:?}", object_type, object);

                Ok(())
            }
        }
    }

    /// Begins a new command sequence.
    #[inline]
    pub fn begin_sequence(&mut self) -> Id<CommandSequence> {
        self.lifetime.begin_sequence()
    }

    /// Records that `sequence` refers to `object`. The objects that `object` is built on, such
    /// as the image of an image view or the contents of a descriptor set, are referred to as
    /// well.
    pub fn record_reference(
        &mut self,
        sequence: Id<CommandSequence>,
        object: ObjectId,
    ) -> Result<(), ValidationReport> {
        let objects = self.expand_all([object]);

        ValidationReport::run(self.mode, |report| {
            if !self.contains(object) && !self.lifetime.is_destroyed(object) {
                report.push(invalid_handle(object).add_context("object"))?;
            }

            self.lifetime
                .check_record_reference(sequence, &objects, report)
                .map(drop)
        })?;

        self.lifetime.add_references(sequence, &objects);

        Ok(())
    }

    /// Binds a descriptor set in `sequence`, recording references to the set and to everything
    /// written to it.
    pub fn bind_descriptor_set(
        &mut self,
        sequence: Id<CommandSequence>,
        descriptor_set: Id<DescriptorSet>,
    ) -> Result<(), ValidationReport> {
        let objects = self.expand_all([descriptor_set.erase()]);

        ValidationReport::run(self.mode, |report| {
            if let Some(set) = self.resolve(descriptor_set, "descriptor_set", report)? {
                if set.pool_flags().intersects(DescriptorPoolCreateFlags::HOST_ONLY) {
                    report.push(Box::new(ValidationError {
                        context: "descriptor_set".into(),
                        problem: "was allocated from a pool created with \
                            `DescriptorPoolCreateFlags::HOST_ONLY`"
                            .into(),
                        vuids: &["VUID-vkCmdBindDescriptorSets-pDescriptorSets-04616"],
                        ..Default::default()
                    }))?;
                }
            }

            self.lifetime
                .check_record_reference(sequence, &objects, report)
                .map(drop)
        })?;

        self.lifetime.add_references(sequence, &objects);

        Ok(())
    }

    /// Ends the recording of `sequence`.
    #[inline]
    pub fn end_sequence(&mut self, sequence: Id<CommandSequence>) -> Result<(), ValidationReport> {
        self.lifetime.end_sequence(sequence)
    }

    /// Submits `sequence`. Fails if any object it refers to has been destroyed.
    #[inline]
    pub fn submit(&mut self, sequence: Id<CommandSequence>) -> Result<(), ValidationReport> {
        self.lifetime.submit(sequence)
    }

    /// Marks `sequence` as having finished execution.
    #[inline]
    pub fn retire(&mut self, sequence: Id<CommandSequence>) -> Result<(), ValidationReport> {
        self.lifetime.retire(sequence)
    }

    /// Resets `sequence` to the recording state with no references.
    #[inline]
    pub fn reset_sequence(
        &mut self,
        sequence: Id<CommandSequence>,
    ) -> Result<(), ValidationReport> {
        self.lifetime.reset_sequence(sequence)
    }

    /// Frees `sequence`.
    #[inline]
    pub fn free_sequence(&mut self, sequence: Id<CommandSequence>) -> Result<(), ValidationReport> {
        self.lifetime.free_sequence(sequence)
    }

    /// Returns the state of `object` as seen by the command sequences.
    #[inline]
    pub fn resource_state(&self, object: ObjectId) -> ResourceState {
        self.lifetime.resource_state(object)
    }

    /// Returns the state of `sequence`.
    #[inline]
    pub fn sequence_state(
        &self,
        sequence: Id<CommandSequence>,
    ) -> Result<SequenceState, InvalidSlotError> {
        self.lifetime.sequence_state(sequence)
    }

    fn insert<O: Stored>(&mut self, object: O) -> Id<O> {
        let id = Id::new(O::slots_mut(self).insert_with_tag(object, O::TAG));
        log::trace!("created {:?} {:?}", O::TYPE, id);

        id
    }

    /// Returns `objects` together with every object they are built on, each once.
    fn expand_all(&self, objects: impl IntoIterator<Item = ObjectId>) -> Vec<ObjectId> {
        let mut expanded = Vec::new();

        for object in objects {
            self.expand(object, &mut expanded);
        }

        expanded
    }

    fn expand(&self, object: ObjectId, expanded: &mut Vec<ObjectId>) {
        if expanded.contains(&object) {
            return;
        }

        expanded.push(object);
        let slot = object.slot;

        match object.object_type() {
            ObjectType::BufferView => {
                if let Some(buffer_view) = self.buffer_views.get(slot) {
                    self.expand(buffer_view.buffer().erase(), expanded);
                }
            }
            ObjectType::ImageView => {
                if let Some(image_view) = self.image_views.get(slot) {
                    self.expand(image_view.image().erase(), expanded);
                }
            }
            ObjectType::Framebuffer => {
                if let Some(framebuffer) = self.framebuffers.get(slot) {
                    self.expand(framebuffer.render_pass().erase(), expanded);

                    for &attachment in framebuffer.attachments() {
                        self.expand(attachment.erase(), expanded);
                    }
                }
            }
            ObjectType::DescriptorSet => {
                if let Some(set) = self.descriptor_sets.get(slot) {
                    for object in set.referenced_objects() {
                        self.expand(object, expanded);
                    }
                }
            }
            _ => (),
        }
    }
}

fn invalid_handle<O>(id: Id<O>) -> Box<ValidationError> {
    Box::new(ValidationError {
        problem: format!(
            "is not a handle to a live `{:?}` of the object graph ({:?})",
            id.object_type(),
            id,
        )
        .into(),
        vuids: &[INVALID_HANDLE],
        kind: ErrorKind::Structural,
        ..Default::default()
    })
}

/// An [`ObjectGraph`] that can be shared between threads.
///
/// The methods of the graph must not run concurrently, so every access goes through a lock.
#[derive(Debug)]
pub struct SharedGraph {
    inner: Mutex<ObjectGraph>,
}

impl SharedGraph {
    /// Wraps `graph`.
    #[inline]
    pub fn new(graph: ObjectGraph) -> Self {
        SharedGraph {
            inner: Mutex::new(graph),
        }
    }

    /// Locks the graph, blocking until no other thread holds it.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, ObjectGraph> {
        self.inner.lock()
    }

    /// Returns the graph.
    #[inline]
    pub fn into_inner(self) -> ObjectGraph {
        self.inner.into_inner()
    }
}

/// Error that can happen when trying to retrieve an object by [`Id`].
#[derive(Debug)]
pub struct InvalidSlotError {
    id: ObjectId,
}

impl InvalidSlotError {
    pub(crate) fn new<O>(id: Id<O>) -> Self {
        InvalidSlotError { id: id.erase() }
    }

    /// Returns the ID that could not be resolved.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl fmt::Display for InvalidSlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let &Self { id } = self;
        let object_type = id.object_type();

        write!(f, "invalid slot for object type `{object_type:?}`: {id:?}")
    }
}

impl Error for InvalidSlotError {}

/// This ID type is used throughout the crate to refer to the objects of an [`ObjectGraph`].
///
/// The type parameter denotes the type of object being referred to. An `Id` with the default
/// parameter is a type-erased [`ObjectId`], which still knows the type of its object.
///
/// Note that this ID **is not** globally unique. It is unique in the scope of one graph, and is
/// never reused within it, even after the object is destroyed.
#[repr(transparent)]
pub struct Id<T = ()> {
    slot: SlotId,
    marker: PhantomData<fn() -> T>,
}

/// A type-erased [`Id`].
pub type ObjectId = Id;

impl<O: Object> Id<O> {
    /// An ID that's guaranteed to be invalid. It still reports `O` as its object type.
    pub const INVALID: Self = Id {
        slot: SlotId::invalid_with_tag(O::TAG),
        marker: PhantomData,
    };
}

impl<T> Id<T> {
    pub(crate) const fn new(slot: SlotId) -> Self {
        Id {
            slot,
            marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) const fn slot(self) -> SlotId {
        self.slot
    }

    /// Returns the type-erased ID.
    #[inline]
    pub const fn erase(self) -> ObjectId {
        Id::new(self.slot)
    }

    /// Returns the type of object the ID refers to.
    pub fn object_type(self) -> ObjectType {
        match self.slot.tag() {
            Buffer::TAG => ObjectType::Buffer,
            BufferView::TAG => ObjectType::BufferView,
            Image::TAG => ObjectType::Image,
            ImageView::TAG => ObjectType::ImageView,
            Sampler::TAG => ObjectType::Sampler,
            RenderPass::TAG => ObjectType::RenderPass,
            Framebuffer::TAG => ObjectType::Framebuffer,
            DescriptorSetLayout::TAG => ObjectType::DescriptorSetLayout,
            DescriptorPool::TAG => ObjectType::DescriptorPool,
            DescriptorSet::TAG => ObjectType::DescriptorSet,
            CommandSequence::TAG => ObjectType::CommandSequence,
            _ => unreachable!(),
        }
    }
}

impl Id {
    /// Returns the typed ID, if the object is of type `O`.
    #[inline]
    pub fn downcast<O: Object>(self) -> Option<Id<O>> {
        (self.object_type() == O::TYPE).then(|| Id::new(self.slot))
    }
}

impl<T> Clone for Id<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.slot, f)
    }
}

impl<T> PartialEq for Id<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
    }
}

impl<T> PartialOrd for Id<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.slot.cmp(&other.slot)
    }
}

/// The types of object that an [`ObjectGraph`] holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Buffer = 0,
    BufferView = 1,
    Image = 2,
    ImageView = 3,
    Sampler = 4,
    RenderPass = 5,
    Framebuffer = 6,
    DescriptorSetLayout = 7,
    DescriptorPool = 8,
    DescriptorSet = 9,
    CommandSequence = 10,
}

/// An object that can be looked up in an [`ObjectGraph`].
///
/// This trait is sealed.
pub trait Object: private::Sealed + Sized {
    /// The type of the object.
    const TYPE: ObjectType;

    #[doc(hidden)]
    const TAG: u32 = Self::TYPE as u32;

    #[doc(hidden)]
    fn lookup(graph: &ObjectGraph, id: Id<Self>) -> Option<&Self>;
}

/// An object that the graph stores in a slot map of its own.
pub(crate) trait Stored: Object {
    fn slots_mut(graph: &mut ObjectGraph) -> &mut SlotMap<Self>;
}

mod private {
    pub trait Sealed {}
}

macro_rules! stored_objects {
    ($($ty:ident => $field:ident,)+) => {
        $(
            impl private::Sealed for $ty {}

            impl Object for $ty {
                const TYPE: ObjectType = ObjectType::$ty;

                #[inline]
                fn lookup(graph: &ObjectGraph, id: Id<Self>) -> Option<&Self> {
                    graph.$field.get(id.slot)
                }
            }

            impl Stored for $ty {
                #[inline]
                fn slots_mut(graph: &mut ObjectGraph) -> &mut SlotMap<Self> {
                    &mut graph.$field
                }
            }
        )+
    };
}

stored_objects! {
    Buffer => buffers,
    BufferView => buffer_views,
    Image => images,
    ImageView => image_views,
    Sampler => samplers,
    RenderPass => render_passes,
    Framebuffer => framebuffers,
    DescriptorSetLayout => descriptor_set_layouts,
    DescriptorPool => descriptor_pools,
    DescriptorSet => descriptor_sets,
}

impl private::Sealed for CommandSequence {}

impl Object for CommandSequence {
    const TYPE: ObjectType = ObjectType::CommandSequence;

    #[inline]
    fn lookup(graph: &ObjectGraph, id: Id<Self>) -> Option<&Self> {
        graph.lifetime.sequence(id).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{buffer::BufferUsage, format::Format, image::ImageUsage};

    fn image_view(graph: &mut ObjectGraph) -> Id<ImageView> {
        let image = graph
            .create_image(ImageCreateInfo {
                format: Format::R8G8B8A8_UNORM,
                extent: [64, 64, 1],
                usage: ImageUsage::SAMPLED | ImageUsage::COLOR_ATTACHMENT,
                ..Default::default()
            })
            .unwrap();

        graph
            .create_image_view(ImageViewCreateInfo::from_image(image))
            .unwrap()
    }

    #[test]
    fn ids_of_different_types_differ() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let buffer = graph
            .create_buffer(BufferCreateInfo {
                size: 64,
                usage: BufferUsage::UNIFORM_BUFFER,
                ..Default::default()
            })
            .unwrap();
        let sampler = graph.create_sampler(SamplerCreateInfo::default()).unwrap();

        assert_ne!(buffer.erase(), sampler.erase());
        assert_eq!(buffer.erase().object_type(), ObjectType::Buffer);
        assert_eq!(sampler.erase().object_type(), ObjectType::Sampler);
        assert_eq!(sampler.erase().downcast::<Sampler>(), Some(sampler));
        assert_eq!(sampler.erase().downcast::<Buffer>(), None);
        assert!(graph.contains(buffer.erase()));
    }

    #[test]
    fn stale_handles() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let sampler = graph.create_sampler(SamplerCreateInfo::default()).unwrap();
        graph.destroy(sampler).unwrap();

        let err = graph.get(sampler).unwrap_err();
        assert_eq!(err.id(), sampler.erase());
        assert!(err.to_string().starts_with("invalid slot for object type `Sampler`"));
        assert!(!graph.contains(sampler.erase()));
        assert_eq!(graph.resource_state(sampler.erase()), ResourceState::Destroyed);

        let report = graph.destroy(sampler).unwrap_err();
        assert!(report.contains(lifetime::DANGLING_REFERENCE));

        let report = graph.destroy(Id::<Image>::INVALID).unwrap_err();
        assert!(report.contains(INVALID_HANDLE));
        assert_eq!(report.first().unwrap().kind(), ErrorKind::Structural);
        assert!(report.first().unwrap().problem.contains("`Image`"));
    }

    #[test]
    fn invalid_ids_keep_their_type() {
        let invalid = Id::<Image>::INVALID.erase();

        assert_eq!(invalid.object_type(), ObjectType::Image);
        assert_eq!(invalid.downcast::<Image>(), Some(Id::<Image>::INVALID));
        assert_eq!(invalid.downcast::<Buffer>(), None);
        assert_ne!(invalid, Id::<Buffer>::INVALID.erase());
        assert!(!ObjectGraph::new(CapabilitySet::new()).contains(invalid));
    }

    #[test]
    fn failed_creation_inserts_nothing() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let report = graph
            .create_image_view(ImageViewCreateInfo::from_image(Id::INVALID))
            .unwrap_err();

        assert_eq!(report.errors()[0].context, "create_info.image");
        assert!(report.contains(INVALID_HANDLE));
    }

    #[test]
    fn references_expand() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let view = image_view(&mut graph);
        let image = graph.get(view).unwrap().image();

        let sequence = graph.begin_sequence();
        graph.record_reference(sequence, view.erase()).unwrap();

        assert_eq!(
            graph.resource_state(image.erase()),
            ResourceState::ReferencedByRecording,
        );

        let report = graph.destroy(image).unwrap_err();
        assert!(report.contains("VUID-vkDestroyImage-image-01000"));

        graph.end_sequence(sequence).unwrap();
        graph.submit(sequence).unwrap();
        graph.retire(sequence).unwrap();

        graph.destroy(view).unwrap();
        graph.destroy(image).unwrap();
        assert_eq!(
            graph.sequence_state(sequence).unwrap(),
            SequenceState::Retired,
        );
    }

    #[test]
    fn shared_graph() {
        let shared = SharedGraph::new(ObjectGraph::new(CapabilitySet::new()));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let mut graph = shared.lock();
                    graph.create_sampler(SamplerCreateInfo::default()).unwrap();
                });
            }
        });

        assert_eq!(shared.into_inner().samplers.len(), 4);
    }
}
