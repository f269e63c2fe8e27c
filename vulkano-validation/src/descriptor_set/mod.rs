// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Bindings between shaders and the resources they access.
//!
//! # Overview
//!
//! In order to access a buffer or an image from a shader, that buffer or image must be put in a
//! *descriptor*. Each descriptor contains one buffer or one image alongside with the way that it
//! can be accessed. Descriptors are grouped in what is called *descriptor sets*.
//!
//! The layout of a descriptor set is described by a [`DescriptorSetLayout`]. Sets are allocated
//! from a [`DescriptorPool`], which has a fixed capacity of descriptors of each type, and are
//! then filled with [`WriteDescriptorSet`] and [`CopyDescriptorSet`] updates.
//!
//! Every operation in this module is validated by [`DescriptorRules`] before the object graph is
//! changed. A set remembers what was written into each of its descriptors, so that copies carry
//! their resources along, and so that binding a set to a command sequence records references to
//! everything it contains.

pub use self::{
    layout::{
        BindingSlots, DescriptorBindingFlags, DescriptorSetLayout, DescriptorSetLayoutBinding,
        DescriptorSetLayoutCreateFlags, DescriptorSetLayoutCreateInfo, DescriptorSlotTable,
        DescriptorType, ShaderStages, SpanError,
    },
    pool::{
        DescriptorPool, DescriptorPoolCreateFlags, DescriptorPoolCreateInfo,
        DescriptorSetAllocateInfo,
    },
    update::{
        CopyDescriptorSet, DescriptorBufferInfo, DescriptorData, DescriptorImageInfo,
        DescriptorRules, WriteDescriptorSet,
    },
};
use crate::{
    buffer::{Buffer, BufferView},
    image::{ImageLayout, ImageView},
    sampler::Sampler,
    DeviceSize, Id, ObjectId,
};
use foldhash::HashMap;
use smallvec::SmallVec;
use std::ops::Range;

pub mod layout;
pub mod pool;
pub mod update;

/// A descriptor set allocated from a [`DescriptorPool`].
#[derive(Debug)]
pub struct DescriptorSet {
    layout: Id<DescriptorSetLayout>,
    pool: Id<DescriptorPool>,
    layout_flags: DescriptorSetLayoutCreateFlags,
    pool_flags: DescriptorPoolCreateFlags,
    variable_descriptor_count: u32,
    slot_table: DescriptorSlotTable,
    descriptor_counts: HashMap<DescriptorType, u32>,
    contents: Vec<Option<BoundDescriptor>>,
}

impl DescriptorSet {
    pub(crate) fn new(
        layout_id: Id<DescriptorSetLayout>,
        layout: &DescriptorSetLayout,
        pool_id: Id<DescriptorPool>,
        pool: &DescriptorPool,
        variable_descriptor_count: u32,
    ) -> Self {
        let slot_table = layout.slot_table().with_variable_count(variable_descriptor_count);

        DescriptorSet {
            layout: layout_id,
            pool: pool_id,
            layout_flags: layout.flags(),
            pool_flags: pool.flags(),
            variable_descriptor_count,
            contents: vec![None; slot_table.slot_count() as usize],
            slot_table,
            descriptor_counts: layout.descriptor_counts_with_variable(variable_descriptor_count),
        }
    }

    /// Returns the layout that the set was allocated with.
    #[inline]
    pub fn layout(&self) -> Id<DescriptorSetLayout> {
        self.layout
    }

    /// Returns the pool that the set was allocated from.
    #[inline]
    pub fn pool(&self) -> Id<DescriptorPool> {
        self.pool
    }

    /// Returns the flags of the layout that the set was allocated with.
    #[inline]
    pub fn layout_flags(&self) -> DescriptorSetLayoutCreateFlags {
        self.layout_flags
    }

    /// Returns the flags of the pool that the set was allocated from.
    #[inline]
    pub fn pool_flags(&self) -> DescriptorPoolCreateFlags {
        self.pool_flags
    }

    /// Returns the variable descriptor count that the set was allocated with.
    #[inline]
    pub fn variable_descriptor_count(&self) -> u32 {
        self.variable_descriptor_count
    }

    /// Returns where the descriptors of each binding are stored in this set.
    #[inline]
    pub fn slot_table(&self) -> &DescriptorSlotTable {
        &self.slot_table
    }

    /// Returns what was last written to the given array element of a binding, or `None` if it
    /// was never written or does not exist.
    pub fn descriptor(&self, binding: u32, array_element: u32) -> Option<&BoundDescriptor> {
        let binding = self.slot_table.binding(binding)?;

        if array_element >= binding.descriptor_count {
            return None;
        }

        self.contents[(binding.first_slot + array_element) as usize].as_ref()
    }

    pub(crate) fn descriptor_counts(&self) -> &HashMap<DescriptorType, u32> {
        &self.descriptor_counts
    }

    pub(crate) fn slots(&self, range: Range<u32>) -> &[Option<BoundDescriptor>] {
        &self.contents[range.start as usize..range.end as usize]
    }

    pub(crate) fn write_slots(
        &mut self,
        first_slot: u32,
        descriptors: impl IntoIterator<Item = Option<BoundDescriptor>>,
    ) {
        for (slot, descriptor) in self.contents[first_slot as usize..]
            .iter_mut()
            .zip(descriptors)
        {
            *slot = descriptor;
        }
    }

    /// Returns every object that a descriptor of the set currently refers to. Each object is
    /// returned once.
    pub fn referenced_objects(&self) -> Vec<ObjectId> {
        let mut objects: Vec<_> = (self.contents.iter().flatten())
            .flat_map(BoundDescriptor::referenced_objects)
            .collect();
        objects.sort_unstable();
        objects.dedup();

        objects
    }
}

/// The contents of one written descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundDescriptor {
    /// The type that the descriptor was written as. For a binding of type
    /// [`DescriptorType::Mutable`] this is the type chosen by the write.
    pub descriptor_type: DescriptorType,

    /// The resource held by the descriptor.
    pub resource: BoundResource,
}

/// A resource held by a descriptor.
///
/// Descriptors only observe resources, they never keep them alive. A resource that is destroyed
/// after it was written leaves the descriptor dangling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundResource {
    /// A sampler, for [`DescriptorType::Sampler`].
    Sampler(Id<Sampler>),

    /// An image view with optional sampler. A `None` image view is a null descriptor.
    Image {
        image_view: Option<Id<ImageView>>,
        image_layout: ImageLayout,
        sampler: Option<Id<Sampler>>,
    },

    /// A range of a buffer. A `None` buffer is a null descriptor.
    Buffer {
        buffer: Option<Id<Buffer>>,
        offset: DeviceSize,
        range: DeviceSize,
    },

    /// A buffer view. `None` is a null descriptor.
    TexelBufferView(Option<Id<BufferView>>),

    /// One byte of an inline uniform block.
    InlineByte(u8),
}

impl BoundDescriptor {
    /// Returns the objects that the descriptor refers to.
    pub fn referenced_objects(&self) -> SmallVec<[ObjectId; 2]> {
        let mut objects = SmallVec::new();

        match self.resource {
            BoundResource::Sampler(sampler) => objects.push(sampler.erase()),
            BoundResource::Image {
                image_view,
                sampler,
                ..
            } => {
                objects.extend(image_view.map(Id::erase));
                objects.extend(sampler.map(Id::erase));
            }
            BoundResource::Buffer { buffer, .. } => objects.extend(buffer.map(Id::erase)),
            BoundResource::TexelBufferView(buffer_view) => {
                objects.extend(buffer_view.map(Id::erase))
            }
            BoundResource::InlineByte(_) => (),
        }

        objects
    }
}
