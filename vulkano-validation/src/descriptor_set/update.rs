// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use super::{
    layout::{
        BindingSlots, DescriptorBindingFlags, DescriptorSetLayoutBinding,
        DescriptorSetLayoutCreateFlags, DescriptorType, SpanError,
    },
    pool::{DescriptorPoolCreateFlags, DescriptorSetAllocateInfo},
    BoundDescriptor, BoundResource, DescriptorSet,
};
use crate::{
    buffer::{Buffer, BufferUsage, BufferView, WHOLE_SIZE},
    image::{ImageAspects, ImageLayout, ImageUsage, ImageView},
    lifetime::ResourceState,
    report::Halt,
    sampler::Sampler,
    DeviceSize, ErrorKind, Id, ObjectGraph, Requires, RequiresAllOf, RequiresOneOf,
    ValidationError, ValidationMode, ValidationReport,
};
use std::ops::Range;

/// The resources written by one [`WriteDescriptorSet`].
///
/// The variant must match the descriptor type of the write. An inline uniform block is written
/// as raw bytes, and the number of bytes takes the place of the descriptor count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DescriptorData {
    /// For [`DescriptorType::Sampler`], [`DescriptorType::CombinedImageSampler`],
    /// [`DescriptorType::SampledImage`], [`DescriptorType::StorageImage`] and
    /// [`DescriptorType::InputAttachment`].
    Image(Vec<DescriptorImageInfo>),

    /// For [`DescriptorType::UniformBuffer`], [`DescriptorType::StorageBuffer`],
    /// [`DescriptorType::UniformBufferDynamic`] and [`DescriptorType::StorageBufferDynamic`].
    Buffer(Vec<DescriptorBufferInfo>),

    /// For [`DescriptorType::UniformTexelBuffer`] and [`DescriptorType::StorageTexelBuffer`].
    /// `None` writes a null descriptor.
    TexelBufferView(Vec<Option<Id<BufferView>>>),

    /// For [`DescriptorType::InlineUniformBlock`].
    InlineData(Vec<u8>),
}

impl DescriptorData {
    /// Returns the number of descriptors, or bytes for inline data, that are written.
    pub fn len(&self) -> usize {
        match self {
            DescriptorData::Image(infos) => infos.len(),
            DescriptorData::Buffer(infos) => infos.len(),
            DescriptorData::TexelBufferView(views) => views.len(),
            DescriptorData::InlineData(data) => data.len(),
        }
    }

    /// Returns whether nothing is written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn variant_name(&self) -> &'static str {
        match self {
            DescriptorData::Image(_) => "DescriptorData::Image",
            DescriptorData::Buffer(_) => "DescriptorData::Buffer",
            DescriptorData::TexelBufferView(_) => "DescriptorData::TexelBufferView",
            DescriptorData::InlineData(_) => "DescriptorData::InlineData",
        }
    }

    /// Returns whether the variant can be written as `descriptor_type`.
    fn matches(&self, descriptor_type: DescriptorType) -> bool {
        match descriptor_type {
            DescriptorType::Sampler
            | DescriptorType::CombinedImageSampler
            | DescriptorType::SampledImage
            | DescriptorType::StorageImage
            | DescriptorType::InputAttachment => matches!(self, DescriptorData::Image(_)),
            DescriptorType::UniformTexelBuffer | DescriptorType::StorageTexelBuffer => {
                matches!(self, DescriptorData::TexelBufferView(_))
            }
            DescriptorType::UniformBuffer
            | DescriptorType::StorageBuffer
            | DescriptorType::UniformBufferDynamic
            | DescriptorType::StorageBufferDynamic => matches!(self, DescriptorData::Buffer(_)),
            DescriptorType::InlineUniformBlock => matches!(self, DescriptorData::InlineData(_)),
            DescriptorType::Mutable => false,
        }
    }
}

/// An image view, sampler or both, written to an image descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptorImageInfo {
    /// The sampler. Only used for [`DescriptorType::Sampler`] and
    /// [`DescriptorType::CombinedImageSampler`], and must be `None` if the binding has
    /// immutable samplers.
    ///
    /// The default value is `None`.
    pub sampler: Option<Id<Sampler>>,

    /// The image view. Ignored for [`DescriptorType::Sampler`]. `None` writes a null descriptor.
    ///
    /// The default value is `None`.
    pub image_view: Option<Id<ImageView>>,

    /// The layout that the image will be in when the descriptor is accessed.
    ///
    /// The default value is [`ImageLayout::Undefined`].
    pub image_layout: ImageLayout,

    pub _ne: crate::NonExhaustive,
}

impl Default for DescriptorImageInfo {
    #[inline]
    fn default() -> Self {
        Self {
            sampler: None,
            image_view: None,
            image_layout: ImageLayout::Undefined,
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl DescriptorImageInfo {
    /// Returns a `DescriptorImageInfo` holding only a sampler.
    #[inline]
    pub fn sampler(sampler: Id<Sampler>) -> Self {
        Self {
            sampler: Some(sampler),
            ..Default::default()
        }
    }

    /// Returns a `DescriptorImageInfo` holding an image view in the given layout.
    #[inline]
    pub fn image_view(image_view: Id<ImageView>, image_layout: ImageLayout) -> Self {
        Self {
            image_view: Some(image_view),
            image_layout,
            ..Default::default()
        }
    }

    /// Returns a `DescriptorImageInfo` holding an image view and a sampler.
    #[inline]
    pub fn combined(
        image_view: Id<ImageView>,
        image_layout: ImageLayout,
        sampler: Id<Sampler>,
    ) -> Self {
        Self {
            sampler: Some(sampler),
            image_view: Some(image_view),
            image_layout,
            _ne: crate::NonExhaustive(()),
        }
    }
}

/// A range of a buffer, written to a buffer descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptorBufferInfo {
    /// The buffer. `None` writes a null descriptor.
    ///
    /// The default value is `None`.
    pub buffer: Option<Id<Buffer>>,

    /// The offset in bytes of the range.
    ///
    /// The default value is `0`.
    pub offset: DeviceSize,

    /// The size in bytes of the range, or [`WHOLE_SIZE`] for the rest of the buffer.
    ///
    /// The default value is [`WHOLE_SIZE`].
    pub range: DeviceSize,

    pub _ne: crate::NonExhaustive,
}

impl Default for DescriptorBufferInfo {
    #[inline]
    fn default() -> Self {
        Self {
            buffer: None,
            offset: 0,
            range: WHOLE_SIZE,
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl DescriptorBufferInfo {
    /// Returns a `DescriptorBufferInfo` for the given range of `buffer`.
    #[inline]
    pub fn new(buffer: Id<Buffer>, offset: DeviceSize, range: DeviceSize) -> Self {
        Self {
            buffer: Some(buffer),
            offset,
            range,
            _ne: crate::NonExhaustive(()),
        }
    }
}

/// Represents a single write operation to the bindings of a descriptor set.
#[derive(Clone, Debug)]
pub struct WriteDescriptorSet {
    /// The set to write to.
    pub dst_set: Id<DescriptorSet>,

    /// The binding to write to.
    pub dst_binding: u32,

    /// The first array element to write. For an inline uniform block, the byte offset.
    pub dst_array_element: u32,

    /// The type of the written descriptors. Must equal the type of the binding, or for a
    /// mutable binding, be one of the types it allows.
    pub descriptor_type: DescriptorType,

    /// The written resources.
    pub data: DescriptorData,

    pub _ne: crate::NonExhaustive,
}

impl WriteDescriptorSet {
    /// Returns a `WriteDescriptorSet` that writes `data` starting at the first array element of
    /// `dst_binding`.
    #[inline]
    pub fn new(
        dst_set: Id<DescriptorSet>,
        dst_binding: u32,
        descriptor_type: DescriptorType,
        data: DescriptorData,
    ) -> Self {
        Self {
            dst_set,
            dst_binding,
            dst_array_element: 0,
            descriptor_type,
            data,
            _ne: crate::NonExhaustive(()),
        }
    }

    fn bound_descriptors(&self) -> Vec<Option<BoundDescriptor>> {
        let descriptor_type = self.descriptor_type;
        let bound = |resource| {
            Some(BoundDescriptor {
                descriptor_type,
                resource,
            })
        };

        match &self.data {
            DescriptorData::Image(infos) => (infos.iter())
                .map(|info| {
                    let resource = match (descriptor_type, info.sampler) {
                        (DescriptorType::Sampler, Some(sampler)) => BoundResource::Sampler(sampler),
                        (DescriptorType::Sampler, None) => return None,
                        _ => BoundResource::Image {
                            image_view: info.image_view,
                            image_layout: info.image_layout,
                            sampler: info.sampler,
                        },
                    };

                    bound(resource)
                })
                .collect(),
            DescriptorData::Buffer(infos) => (infos.iter())
                .map(|info| {
                    bound(BoundResource::Buffer {
                        buffer: info.buffer,
                        offset: info.offset,
                        range: info.range,
                    })
                })
                .collect(),
            DescriptorData::TexelBufferView(views) => (views.iter())
                .map(|&view| bound(BoundResource::TexelBufferView(view)))
                .collect(),
            DescriptorData::InlineData(data) => (data.iter())
                .map(|&byte| bound(BoundResource::InlineByte(byte)))
                .collect(),
        }
    }
}

/// Represents a single copy operation between the bindings of descriptor sets.
#[derive(Clone, Debug)]
pub struct CopyDescriptorSet {
    /// The set to copy from.
    pub src_set: Id<DescriptorSet>,

    /// The binding to copy from.
    ///
    /// The default value is `0`.
    pub src_binding: u32,

    /// The first array element to copy from.
    ///
    /// The default value is `0`.
    pub src_array_element: u32,

    /// The set to copy to.
    pub dst_set: Id<DescriptorSet>,

    /// The binding to copy to.
    ///
    /// The default value is `0`.
    pub dst_binding: u32,

    /// The first array element to copy to.
    ///
    /// The default value is `0`.
    pub dst_array_element: u32,

    /// The number of descriptors to copy. For inline uniform blocks, the number of bytes.
    ///
    /// The default value is `1`.
    pub descriptor_count: u32,

    pub _ne: crate::NonExhaustive,
}

impl CopyDescriptorSet {
    /// Returns a `CopyDescriptorSet` that copies the first descriptor of binding 0.
    #[inline]
    pub fn new(src_set: Id<DescriptorSet>, dst_set: Id<DescriptorSet>) -> Self {
        Self {
            src_set,
            src_binding: 0,
            src_array_element: 0,
            dst_set,
            dst_binding: 0,
            dst_array_element: 0,
            descriptor_count: 1,
            _ne: crate::NonExhaustive(()),
        }
    }
}

/// A write that passed validation, ready to be applied.
pub(crate) struct PendingWrite {
    pub(crate) dst_set: Id<DescriptorSet>,
    pub(crate) first_slot: u32,
    pub(crate) descriptors: Vec<Option<BoundDescriptor>>,
}

/// A copy that passed validation, ready to be applied.
pub(crate) struct PendingCopy {
    pub(crate) src_set: Id<DescriptorSet>,
    pub(crate) src_slots: Range<u32>,
    pub(crate) dst_set: Id<DescriptorSet>,
    pub(crate) dst_first_slot: u32,
}

/// Validates descriptor set layouts, allocations and updates against an [`ObjectGraph`].
///
/// The rules never modify the graph. [`ObjectGraph`] runs them before every descriptor
/// operation, and they can also be run on their own to check an operation without performing
/// it.
pub struct DescriptorRules<'a> {
    graph: &'a ObjectGraph,
    mode: ValidationMode,
}

impl<'a> DescriptorRules<'a> {
    /// Returns rules that look up objects in `graph`, and report in the graph's mode.
    #[inline]
    pub fn new(graph: &'a ObjectGraph) -> Self {
        DescriptorRules {
            graph,
            mode: graph.mode(),
        }
    }

    /// Sets the validation mode of the reports.
    #[inline]
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Checks one binding of a descriptor set layout that is to be created with `layout_flags`.
    ///
    /// Rules that involve several bindings, such as unique binding numbers, are checked when the
    /// layout is created.
    pub fn validate_layout_binding(
        &self,
        binding: &DescriptorSetLayoutBinding,
        layout_flags: DescriptorSetLayoutCreateFlags,
    ) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            binding.validate(self.graph, report)?;
            binding.validate_layout_flags(layout_flags, report)
        })
    }

    /// Checks whether the sets of `allocate_info` can be allocated from its pool.
    pub fn validate_pool_allocation(
        &self,
        allocate_info: &DescriptorSetAllocateInfo,
    ) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            allocate_info.validate(self.graph, report).map(|_| ())
        })
    }

    /// Checks a write to a descriptor set.
    pub fn validate_write(&self, write: &WriteDescriptorSet) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| self.check_write(write, report).map(|_| ()))
    }

    /// Checks a copy between descriptor sets.
    pub fn validate_copy(&self, copy: &CopyDescriptorSet) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| self.check_copy(copy, report).map(|_| ()))
    }

    pub(crate) fn check_write(
        &self,
        write: &WriteDescriptorSet,
        report: &mut ValidationReport,
    ) -> Result<Option<PendingWrite>, Halt> {
        let &WriteDescriptorSet {
            dst_set,
            dst_binding,
            dst_array_element,
            descriptor_type,
            ref data,
            _ne: _,
        } = write;

        let capabilities = self.graph.capabilities();
        let mark = report.mark();

        let Some(set) = self.graph.resolve(dst_set, "dst_set", report)? else {
            return Ok(None);
        };

        let Some(binding) = set.slot_table().binding(dst_binding) else {
            report.push(Box::new(ValidationError {
                context: "dst_binding".into(),
                problem: "does not exist in the descriptor set layout".into(),
                vuids: &["VUID-VkWriteDescriptorSet-dstBinding-00315"],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;

            return Ok(None);
        };

        if binding.descriptor_count == 0 {
            report.push(Box::new(ValidationError {
                context: "dst_binding".into(),
                problem: "refers to a binding with a descriptor count of zero".into(),
                vuids: &["VUID-VkWriteDescriptorSet-dstBinding-00316"],
                ..Default::default()
            }))?;

            return Ok(None);
        }

        report.check(descriptor_type.validate_capabilities(capabilities).map_err(|err| {
            err.add_context("descriptor_type")
                .set_vuids(&["VUID-VkWriteDescriptorSet-descriptorType-parameter"])
        }))?;

        if binding.descriptor_type == DescriptorType::Mutable {
            if !binding.mutable_descriptor_types.contains(&descriptor_type) {
                report.push(Box::new(ValidationError {
                    context: "descriptor_type".into(),
                    problem: format!(
                        "is `DescriptorType::{:?}`, which is not one of the types that the mutable \
                        binding {} allows",
                        descriptor_type, dst_binding,
                    )
                    .into(),
                    vuids: &["VUID-VkWriteDescriptorSet-dstSet-04611"],
                    ..Default::default()
                }))?;
            }
        } else if descriptor_type != binding.descriptor_type {
            report.push(Box::new(ValidationError {
                context: "descriptor_type".into(),
                problem: format!(
                    "is `DescriptorType::{:?}`, but binding {} has type `DescriptorType::{:?}`",
                    descriptor_type, dst_binding, binding.descriptor_type,
                )
                .into(),
                vuids: &["VUID-VkWriteDescriptorSet-descriptorType-00319"],
                ..Default::default()
            }))?;
        }

        if !data.matches(descriptor_type) {
            let vuids: &'static [&'static str] = match data {
                DescriptorData::Image(_) => &["VUID-VkWriteDescriptorSet-descriptorType-00322"],
                DescriptorData::TexelBufferView(_) => {
                    &["VUID-VkWriteDescriptorSet-descriptorType-00323"]
                }
                DescriptorData::Buffer(_) => &["VUID-VkWriteDescriptorSet-descriptorType-00324"],
                DescriptorData::InlineData(_) => {
                    &["VUID-VkWriteDescriptorSet-descriptorType-02221"]
                }
            };

            report.push(Box::new(ValidationError {
                context: "data".into(),
                problem: format!(
                    "is `{}`, which cannot be written as `DescriptorType::{:?}`",
                    data.variant_name(),
                    descriptor_type,
                )
                .into(),
                vuids,
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;

            return Ok(None);
        }

        if data.is_empty() {
            report.push(Box::new(ValidationError {
                context: "data".into(),
                problem: "is empty".into(),
                vuids: &["VUID-VkWriteDescriptorSet-descriptorCount-arraylength"],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;

            return Ok(None);
        }

        let descriptor_count = u32::try_from(data.len()).unwrap_or(u32::MAX);

        if descriptor_type == DescriptorType::InlineUniformBlock {
            if dst_array_element % 4 != 0 {
                report.push(Box::new(ValidationError {
                    context: "dst_array_element".into(),
                    problem: "is not a multiple of 4, but `descriptor_type` is \
                        `DescriptorType::InlineUniformBlock`"
                        .into(),
                    vuids: &["VUID-VkWriteDescriptorSet-descriptorType-02219"],
                    ..Default::default()
                }))?;
            }

            if descriptor_count % 4 != 0 {
                report.push(Box::new(ValidationError {
                    context: "data".into(),
                    problem: "is not a multiple of 4 bytes long, but `descriptor_type` is \
                        `DescriptorType::InlineUniformBlock`"
                        .into(),
                    vuids: &[
                        "VUID-VkWriteDescriptorSet-descriptorType-02220",
                        "VUID-VkWriteDescriptorSet-descriptorType-02222",
                    ],
                    ..Default::default()
                }))?;
            }
        }

        let span = match set
            .slot_table()
            .span(dst_binding, dst_array_element, descriptor_count)
        {
            Ok(span) => Some(span),
            Err(err) => {
                report.push(span_error(err, UpdateSide::Write))?;
                None
            }
        };

        // Bindings with immutable samplers are read-only once the layout is created.
        if binding.has_immutable_samplers {
            report.push(Box::new(ValidationError {
                context: "dst_binding".into(),
                problem: format!(
                    "is {}, which is a binding with immutable samplers",
                    dst_binding,
                )
                .into(),
                vuids: &["VUID-VkWriteDescriptorSet-descriptorType-02752"],
                ..Default::default()
            }))?;
        } else {
            self.check_data(data, descriptor_type, report)?;
        }

        self.check_not_in_use(dst_set, binding, "dst_set", report)?;

        Ok(span.filter(|_| !report.failed_since(mark)).map(|span| PendingWrite {
            dst_set,
            first_slot: span.start,
            descriptors: write.bound_descriptors(),
        }))
    }

    fn check_data(
        &self,
        data: &DescriptorData,
        descriptor_type: DescriptorType,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        match data {
            DescriptorData::Image(infos) => {
                for (index, info) in infos.iter().enumerate() {
                    report.scope(format!("data[{}]", index), |report| {
                        self.check_image_info(info, descriptor_type, report)
                    })?;
                }
            }
            DescriptorData::Buffer(infos) => {
                for (index, info) in infos.iter().enumerate() {
                    report.scope(format!("data[{}]", index), |report| {
                        self.check_buffer_info(info, descriptor_type, report)
                    })?;
                }
            }
            DescriptorData::TexelBufferView(views) => {
                for (index, &view) in views.iter().enumerate() {
                    report.scope(format!("data[{}]", index), |report| {
                        self.check_texel_buffer_view(view, descriptor_type, report)
                    })?;
                }
            }
            DescriptorData::InlineData(_) => (),
        }

        Ok(())
    }

    fn check_image_info(
        &self,
        info: &DescriptorImageInfo,
        descriptor_type: DescriptorType,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let &DescriptorImageInfo {
            sampler,
            image_view,
            image_layout,
            _ne: _,
        } = info;

        let capabilities = self.graph.capabilities();

        if matches!(
            descriptor_type,
            DescriptorType::Sampler | DescriptorType::CombinedImageSampler
        ) {
            match sampler {
                Some(sampler) => {
                    self.graph.resolve(sampler, "sampler", report)?;
                }
                None => {
                    report.push(Box::new(ValidationError {
                        context: "sampler".into(),
                        problem: "is `None`, but the binding has no immutable samplers".into(),
                        vuids: &["VUID-VkWriteDescriptorSet-descriptorType-00325"],
                        kind: ErrorKind::Structural,
                        ..Default::default()
                    }))?;
                }
            }
        }

        if descriptor_type == DescriptorType::Sampler {
            return Ok(());
        }

        let Some(image_view) = image_view else {
            if descriptor_type == DescriptorType::InputAttachment {
                report.push(Box::new(ValidationError {
                    context: "image_view".into(),
                    problem: "is `None`, but `descriptor_type` is \
                        `DescriptorType::InputAttachment`"
                        .into(),
                    vuids: &["VUID-VkWriteDescriptorSet-descriptorType-07683"],
                    kind: ErrorKind::Structural,
                    ..Default::default()
                }))?;
            } else if !capabilities.is_feature_enabled("null_descriptor") {
                report.push(Box::new(ValidationError {
                    context: "image_view".into(),
                    problem: "is `None`".into(),
                    requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                        "null_descriptor",
                    )])]),
                    vuids: &["VUID-VkWriteDescriptorSet-descriptorType-02997"],
                    ..Default::default()
                }))?;
            }

            return Ok(());
        };

        let Some(view) = self.graph.resolve(image_view, "image_view", report)? else {
            return Ok(());
        };

        let (layout_legal, layout_vuids, usage, usage_name, usage_vuids): (
            bool,
            &'static [&'static str],
            ImageUsage,
            &str,
            &'static [&'static str],
        ) = match descriptor_type {
            DescriptorType::SampledImage => (
                image_layout.is_shader_readable(),
                &["VUID-VkWriteDescriptorSet-descriptorType-04149"],
                ImageUsage::SAMPLED,
                "ImageUsage::SAMPLED",
                &["VUID-VkWriteDescriptorSet-descriptorType-00337"],
            ),
            DescriptorType::CombinedImageSampler => (
                image_layout.is_shader_readable(),
                &["VUID-VkWriteDescriptorSet-descriptorType-04150"],
                ImageUsage::SAMPLED,
                "ImageUsage::SAMPLED",
                &["VUID-VkWriteDescriptorSet-descriptorType-00337"],
            ),
            DescriptorType::InputAttachment => (
                image_layout.is_shader_readable(),
                &["VUID-VkWriteDescriptorSet-descriptorType-04151"],
                ImageUsage::INPUT_ATTACHMENT,
                "ImageUsage::INPUT_ATTACHMENT",
                &["VUID-VkWriteDescriptorSet-descriptorType-00338"],
            ),
            DescriptorType::StorageImage => (
                image_layout == ImageLayout::General,
                &["VUID-VkWriteDescriptorSet-descriptorType-04152"],
                ImageUsage::STORAGE,
                "ImageUsage::STORAGE",
                &["VUID-VkWriteDescriptorSet-descriptorType-00339"],
            ),
            _ => return Ok(()),
        };

        if !layout_legal {
            report.push(Box::new(ValidationError {
                context: "image_layout".into(),
                problem: format!(
                    "is `ImageLayout::{:?}`, which cannot be used with \
                    `DescriptorType::{:?}`",
                    image_layout, descriptor_type,
                )
                .into(),
                vuids: layout_vuids,
                ..Default::default()
            }))?;
        }

        if !view.usage().intersects(usage) {
            report.push(Box::new(ValidationError {
                context: "image_view".into(),
                problem: format!(
                    "was not created with `{}`, but `descriptor_type` is `DescriptorType::{:?}`",
                    usage_name, descriptor_type,
                )
                .into(),
                vuids: usage_vuids,
                ..Default::default()
            }))?;
        }

        if view
            .aspects()
            .contains(ImageAspects::DEPTH | ImageAspects::STENCIL)
        {
            report.push(Box::new(ValidationError {
                context: "image_view".into(),
                problem: "covers both the depth and the stencil aspect".into(),
                vuids: &["VUID-VkDescriptorImageInfo-imageView-01976"],
                ..Default::default()
            }))?;
        }

        Ok(())
    }

    fn check_buffer_info(
        &self,
        info: &DescriptorBufferInfo,
        descriptor_type: DescriptorType,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let &DescriptorBufferInfo {
            buffer,
            offset,
            range,
            _ne: _,
        } = info;

        let capabilities = self.graph.capabilities();

        let Some(buffer) = buffer else {
            if !capabilities.is_feature_enabled("null_descriptor") {
                report.push(Box::new(ValidationError {
                    context: "buffer".into(),
                    problem: "is `None`".into(),
                    requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                        "null_descriptor",
                    )])]),
                    vuids: &["VUID-VkDescriptorBufferInfo-buffer-02998"],
                    ..Default::default()
                }))?;
            }

            if offset != 0 || range != WHOLE_SIZE {
                report.push(Box::new(ValidationError {
                    problem: "`buffer` is `None`, but `offset` is not zero or `range` is not \
                        `WHOLE_SIZE`"
                        .into(),
                    vuids: &["VUID-VkDescriptorBufferInfo-buffer-02999"],
                    ..Default::default()
                }))?;
            }

            return Ok(());
        };

        let Some(buffer) = self.graph.resolve(buffer, "buffer", report)? else {
            return Ok(());
        };

        let is_uniform = matches!(
            descriptor_type,
            DescriptorType::UniformBuffer | DescriptorType::UniformBufferDynamic
        );

        if is_uniform {
            if !buffer.usage().intersects(BufferUsage::UNIFORM_BUFFER) {
                report.push(Box::new(ValidationError {
                    context: "buffer".into(),
                    problem: "was not created with `BufferUsage::UNIFORM_BUFFER`".into(),
                    vuids: &["VUID-VkWriteDescriptorSet-descriptorType-00330"],
                    ..Default::default()
                }))?;
            }
        } else if !buffer.usage().intersects(BufferUsage::STORAGE_BUFFER) {
            report.push(Box::new(ValidationError {
                context: "buffer".into(),
                problem: "was not created with `BufferUsage::STORAGE_BUFFER`".into(),
                vuids: &["VUID-VkWriteDescriptorSet-descriptorType-00331"],
                ..Default::default()
            }))?;
        }

        if offset >= buffer.size() {
            report.push(Box::new(ValidationError {
                context: "offset".into(),
                problem: "is not less than the size of `buffer`".into(),
                vuids: &["VUID-VkDescriptorBufferInfo-offset-00340"],
                ..Default::default()
            }))?;

            // The remaining rules measure the range from the offset.
            return Ok(());
        }

        if range == 0 {
            report.push(Box::new(ValidationError {
                context: "range".into(),
                problem: "is zero".into(),
                vuids: &["VUID-VkDescriptorBufferInfo-range-00341"],
                ..Default::default()
            }))?;
        } else if range != WHOLE_SIZE && offset.saturating_add(range) > buffer.size() {
            report.push(Box::new(ValidationError {
                problem: "`offset + range` is greater than the size of `buffer`".into(),
                vuids: &["VUID-VkDescriptorBufferInfo-range-00342"],
                ..Default::default()
            }))?;
        }

        let effective_range = if range == WHOLE_SIZE {
            buffer.size() - offset
        } else {
            range
        };

        let (range_limit, range_vuids, alignment_limit, alignment_vuids): (
            &str,
            &'static [&'static str],
            &str,
            &'static [&'static str],
        ) = if is_uniform {
            (
                "max_uniform_buffer_range",
                &["VUID-VkWriteDescriptorSet-descriptorType-00332"],
                "min_uniform_buffer_offset_alignment",
                &["VUID-VkWriteDescriptorSet-descriptorType-00327"],
            )
        } else {
            (
                "max_storage_buffer_range",
                &["VUID-VkWriteDescriptorSet-descriptorType-00333"],
                "min_storage_buffer_offset_alignment",
                &["VUID-VkWriteDescriptorSet-descriptorType-00328"],
            )
        };

        if effective_range > capabilities.device_limit(range_limit) {
            report.push(Box::new(ValidationError {
                context: "range".into(),
                problem: format!("is greater than the `{}` limit", range_limit).into(),
                vuids: range_vuids,
                ..Default::default()
            }))?;
        }

        let alignment = capabilities.device_limit(alignment_limit).max(1);

        if offset % alignment != 0 {
            report.push(Box::new(ValidationError {
                context: "offset".into(),
                problem: format!("is not a multiple of the `{}` limit", alignment_limit).into(),
                vuids: alignment_vuids,
                ..Default::default()
            }))?;
        }

        Ok(())
    }

    fn check_texel_buffer_view(
        &self,
        buffer_view: Option<Id<BufferView>>,
        descriptor_type: DescriptorType,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let Some(buffer_view) = buffer_view else {
            if !self.graph.capabilities().is_feature_enabled("null_descriptor") {
                report.push(Box::new(ValidationError {
                    problem: "is `None`".into(),
                    requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                        "null_descriptor",
                    )])]),
                    vuids: &["VUID-VkWriteDescriptorSet-descriptorType-02995"],
                    ..Default::default()
                }))?;
            }

            return Ok(());
        };

        let Some(view) = self.graph.resolve(buffer_view, "", report)? else {
            return Ok(());
        };

        if descriptor_type == DescriptorType::UniformTexelBuffer {
            if !view.usage().intersects(BufferUsage::UNIFORM_TEXEL_BUFFER) {
                report.push(Box::new(ValidationError {
                    problem: "the buffer of the view was not created with \
                        `BufferUsage::UNIFORM_TEXEL_BUFFER`"
                        .into(),
                    vuids: &["VUID-VkWriteDescriptorSet-descriptorType-00334"],
                    ..Default::default()
                }))?;
            }
        } else if !view.usage().intersects(BufferUsage::STORAGE_TEXEL_BUFFER) {
            report.push(Box::new(ValidationError {
                problem: "the buffer of the view was not created with \
                    `BufferUsage::STORAGE_TEXEL_BUFFER`"
                    .into(),
                vuids: &["VUID-VkWriteDescriptorSet-descriptorType-00335"],
                ..Default::default()
            }))?;
        }

        Ok(())
    }

    /// Checks that `set` can be updated at `binding` given the command sequences that use it.
    fn check_not_in_use(
        &self,
        set: Id<DescriptorSet>,
        binding: &BindingSlots,
        context: &'static str,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let in_use = match self.graph.lifetime().resource_state(set.erase()) {
            ResourceState::Live | ResourceState::Destroyed => return Ok(()),
            ResourceState::ReferencedByRecording => "recording",
            ResourceState::ReferencedByInFlight => "pending",
        };

        if !binding.binding_flags.intersects(
            DescriptorBindingFlags::UPDATE_AFTER_BIND
                | DescriptorBindingFlags::UPDATE_UNUSED_WHILE_PENDING,
        ) {
            report.push(Box::new(ValidationError {
                context: context.into(),
                problem: format!(
                    "is used by a {} command sequence, and binding {} was not created with \
                    `DescriptorBindingFlags::UPDATE_AFTER_BIND` or \
                    `DescriptorBindingFlags::UPDATE_UNUSED_WHILE_PENDING`",
                    in_use, binding.binding,
                )
                .into(),
                vuids: &["VUID-vkUpdateDescriptorSets-None-03047"],
                kind: ErrorKind::ResourceInUse,
                ..Default::default()
            }))?;
        }

        Ok(())
    }

    pub(crate) fn check_copy(
        &self,
        copy: &CopyDescriptorSet,
        report: &mut ValidationReport,
    ) -> Result<Option<PendingCopy>, Halt> {
        let &CopyDescriptorSet {
            src_set,
            src_binding,
            src_array_element,
            dst_set,
            dst_binding,
            dst_array_element,
            descriptor_count,
            _ne: _,
        } = copy;

        let mark = report.mark();
        let src = self.graph.resolve(src_set, "src_set", report)?;
        let dst = self.graph.resolve(dst_set, "dst_set", report)?;

        let (Some(src), Some(dst)) = (src, dst) else {
            return Ok(None);
        };

        let src_uab = (src.layout_flags())
            .intersects(DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL);
        let dst_uab = (dst.layout_flags())
            .intersects(DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL);

        if src_uab && !dst_uab {
            report.push(Box::new(ValidationError {
                problem: "the layout of `src_set` was created with \
                    `DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL`, but the layout of \
                    `dst_set` was not"
                    .into(),
                vuids: &["VUID-VkCopyDescriptorSet-srcSet-01918"],
                ..Default::default()
            }))?;
        } else if !src_uab && dst_uab {
            report.push(Box::new(ValidationError {
                problem: "the layout of `src_set` was not created with \
                    `DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL`, but the layout of \
                    `dst_set` was"
                    .into(),
                vuids: &["VUID-VkCopyDescriptorSet-srcSet-04885"],
                ..Default::default()
            }))?;
        }

        let src_pool_uab = (src.pool_flags())
            .intersects(DescriptorPoolCreateFlags::UPDATE_AFTER_BIND);
        let dst_pool_uab = (dst.pool_flags())
            .intersects(DescriptorPoolCreateFlags::UPDATE_AFTER_BIND);

        if src_pool_uab && !dst_pool_uab {
            report.push(Box::new(ValidationError {
                problem: "the pool of `src_set` was created with \
                    `DescriptorPoolCreateFlags::UPDATE_AFTER_BIND`, but the pool of `dst_set` \
                    was not"
                    .into(),
                vuids: &["VUID-VkCopyDescriptorSet-srcSet-01920"],
                ..Default::default()
            }))?;
        } else if !src_pool_uab && dst_pool_uab {
            report.push(Box::new(ValidationError {
                problem: "the pool of `src_set` was not created with \
                    `DescriptorPoolCreateFlags::UPDATE_AFTER_BIND`, but the pool of `dst_set` \
                    was"
                    .into(),
                vuids: &["VUID-VkCopyDescriptorSet-srcSet-04887"],
                ..Default::default()
            }))?;
        }

        let src_slots = src.slot_table().binding(src_binding);
        let dst_slots = dst.slot_table().binding(dst_binding);

        if src_slots.is_none() {
            report.push(Box::new(ValidationError {
                context: "src_binding".into(),
                problem: "does not exist in the layout of `src_set`".into(),
                vuids: &["VUID-VkCopyDescriptorSet-srcBinding-00345"],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        if dst_slots.is_none() {
            report.push(Box::new(ValidationError {
                context: "dst_binding".into(),
                problem: "does not exist in the layout of `dst_set`".into(),
                vuids: &["VUID-VkCopyDescriptorSet-dstBinding-00347"],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        let (Some(src_slots), Some(dst_slots)) = (src_slots, dst_slots) else {
            return Ok(None);
        };

        if src_slots.descriptor_type != dst_slots.descriptor_type {
            report.push(Box::new(ValidationError {
                problem: format!(
                    "binding {} of `dst_set` has type `DescriptorType::{:?}`, but binding {} of \
                    `src_set` has type `DescriptorType::{:?}`",
                    dst_binding,
                    dst_slots.descriptor_type,
                    src_binding,
                    src_slots.descriptor_type,
                )
                .into(),
                vuids: &["VUID-VkCopyDescriptorSet-dstBinding-02632"],
                ..Default::default()
            }))?;
        }

        if dst_slots.has_immutable_samplers {
            report.push(Box::new(ValidationError {
                context: "dst_binding".into(),
                problem: "refers to a binding with immutable samplers".into(),
                vuids: &["VUID-VkCopyDescriptorSet-dstBinding-02753"],
                ..Default::default()
            }))?;
        }

        if src_slots.descriptor_type == DescriptorType::InlineUniformBlock {
            if src_array_element % 4 != 0 {
                report.push(Box::new(ValidationError {
                    context: "src_array_element".into(),
                    problem: "is not a multiple of 4, but `src_binding` is an inline uniform \
                        block"
                        .into(),
                    vuids: &["VUID-VkCopyDescriptorSet-srcBinding-02223"],
                    ..Default::default()
                }))?;
            }

            if descriptor_count % 4 != 0 {
                report.push(Box::new(ValidationError {
                    context: "descriptor_count".into(),
                    problem: "is not a multiple of 4, but `src_binding` is an inline uniform \
                        block"
                        .into(),
                    vuids: &["VUID-VkCopyDescriptorSet-srcBinding-02225"],
                    ..Default::default()
                }))?;
            }
        }

        if dst_slots.descriptor_type == DescriptorType::InlineUniformBlock
            && dst_array_element % 4 != 0
        {
            report.push(Box::new(ValidationError {
                context: "dst_array_element".into(),
                problem: "is not a multiple of 4, but `dst_binding` is an inline uniform block"
                    .into(),
                vuids: &["VUID-VkCopyDescriptorSet-dstBinding-02224"],
                ..Default::default()
            }))?;
        }

        let src_span = match (src.slot_table())
            .span(src_binding, src_array_element, descriptor_count)
        {
            Ok(span) => Some(span),
            Err(err) => {
                report.push(span_error(err, UpdateSide::CopySource))?;
                None
            }
        };

        let dst_span = match (dst.slot_table())
            .span(dst_binding, dst_array_element, descriptor_count)
        {
            Ok(span) => Some(span),
            Err(err) => {
                report.push(span_error(err, UpdateSide::CopyDestination))?;
                None
            }
        };

        if let (Some(src_span), Some(dst_span)) = (&src_span, &dst_span) {
            if src_set == dst_set
                && src_span.start < dst_span.end
                && dst_span.start < src_span.end
            {
                report.push(Box::new(ValidationError {
                    problem: "`src_set` equals `dst_set`, and the copied source and destination \
                        descriptors overlap"
                        .into(),
                    vuids: &["VUID-VkCopyDescriptorSet-srcSet-00349"],
                    ..Default::default()
                }))?;
            }
        }

        self.check_not_in_use(dst_set, dst_slots, "dst_set", report)?;

        if report.failed_since(mark) {
            return Ok(None);
        }

        Ok(src_span.zip(dst_span).map(|(src_slots, dst_span)| PendingCopy {
            src_set,
            src_slots,
            dst_set,
            dst_first_slot: dst_span.start,
        }))
    }
}

#[derive(Clone, Copy)]
enum UpdateSide {
    Write,
    CopySource,
    CopyDestination,
}

fn span_error(err: SpanError, side: UpdateSide) -> Box<ValidationError> {
    let vuids: &'static [&'static str] = match (err, side) {
        (SpanError::NoSuchBinding, UpdateSide::Write) => {
            &["VUID-VkWriteDescriptorSet-dstBinding-00315"]
        }
        (SpanError::NoSuchBinding, UpdateSide::CopySource) => {
            &["VUID-VkCopyDescriptorSet-srcBinding-00345"]
        }
        (SpanError::NoSuchBinding, UpdateSide::CopyDestination) => {
            &["VUID-VkCopyDescriptorSet-dstBinding-00347"]
        }
        (SpanError::OutOfBounds, UpdateSide::Write) => {
            &["VUID-VkWriteDescriptorSet-dstArrayElement-00321"]
        }
        (SpanError::TypeOrStagesMismatch { .. }, UpdateSide::Write) => {
            &["VUID-VkWriteDescriptorSet-descriptorCount-00317"]
        }
        (SpanError::ImmutableSamplersMismatch { .. }, UpdateSide::Write) => {
            &["VUID-VkWriteDescriptorSet-descriptorCount-00318"]
        }
        // Copies roll over only through consecutive bindings of the same kind, so every other
        // failure counts as running out of descriptors.
        (_, UpdateSide::CopySource) => &["VUID-VkCopyDescriptorSet-srcArrayElement-00346"],
        (_, UpdateSide::CopyDestination) => &["VUID-VkCopyDescriptorSet-dstArrayElement-00348"],
    };

    let context = match side {
        UpdateSide::Write => "dst_array_element",
        UpdateSide::CopySource => "src_array_element",
        UpdateSide::CopyDestination => "dst_array_element",
    };

    Box::new(ValidationError {
        context: context.into(),
        problem: err.to_string().into(),
        vuids,
        kind: match err {
            SpanError::NoSuchBinding => ErrorKind::Structural,
            _ => ErrorKind::Consistency,
        },
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        buffer::BufferCreateInfo,
        descriptor_set::{
            layout::DescriptorSetLayoutCreateInfo,
            pool::{DescriptorPool, DescriptorPoolCreateInfo},
        },
        format::Format,
        image::{ImageCreateInfo, ImageUsage, ImageViewCreateInfo},
        sampler::SamplerCreateInfo,
        CapabilitySet,
    };

    fn graph() -> ObjectGraph {
        ObjectGraph::new(CapabilitySet::new()).with_mode(ValidationMode::CollectAll)
    }

    fn pool(graph: &mut ObjectGraph) -> Id<DescriptorPool> {
        graph
            .create_descriptor_pool(DescriptorPoolCreateInfo {
                max_sets: 4,
                pool_sizes: [
                    (DescriptorType::UniformBuffer, 16),
                    (DescriptorType::StorageBuffer, 16),
                    (DescriptorType::CombinedImageSampler, 16),
                ]
                .into_iter()
                .collect(),
                ..Default::default()
            })
            .unwrap()
    }

    fn allocate(
        graph: &mut ObjectGraph,
        bindings: Vec<DescriptorSetLayoutBinding>,
        count: usize,
    ) -> Vec<Id<DescriptorSet>> {
        let layout = graph
            .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
                bindings,
                ..Default::default()
            })
            .unwrap();
        let pool = pool(graph);

        graph
            .allocate_descriptor_sets(DescriptorSetAllocateInfo::new(
                pool,
                std::iter::repeat(layout).take(count),
            ))
            .unwrap()
    }

    fn uniform_binding(binding: u32, descriptor_count: u32) -> DescriptorSetLayoutBinding {
        DescriptorSetLayoutBinding {
            descriptor_count,
            ..DescriptorSetLayoutBinding::new(binding, DescriptorType::UniformBuffer)
        }
    }

    fn buffer(graph: &mut ObjectGraph, usage: BufferUsage) -> Id<Buffer> {
        graph
            .create_buffer(BufferCreateInfo {
                size: 1024,
                usage,
                ..Default::default()
            })
            .unwrap()
    }

    fn uniform_write(
        set: Id<DescriptorSet>,
        dst_array_element: u32,
        buffer: Id<Buffer>,
        count: usize,
    ) -> WriteDescriptorSet {
        WriteDescriptorSet {
            dst_array_element,
            ..WriteDescriptorSet::new(
                set,
                0,
                DescriptorType::UniformBuffer,
                DescriptorData::Buffer(vec![
                    DescriptorBufferInfo::new(buffer, 0, WHOLE_SIZE);
                    count
                ]),
            )
        }
    }

    #[test]
    fn write_rolls_over_into_next_binding() {
        let mut graph = graph();
        let set = allocate(&mut graph, vec![uniform_binding(0, 2), uniform_binding(1, 2)], 1)[0];
        let buffer = buffer(&mut graph, BufferUsage::UNIFORM_BUFFER);

        graph
            .update_descriptor_sets(&[uniform_write(set, 1, buffer, 3)], &[])
            .unwrap();

        let set = graph.get(set).unwrap();
        assert!(set.descriptor(0, 0).is_none());
        assert!(set.descriptor(1, 1).is_some());
        assert_eq!(
            set.descriptor(0, 1).unwrap().resource,
            BoundResource::Buffer {
                buffer: Some(buffer),
                offset: 0,
                range: WHOLE_SIZE,
            },
        );
        assert_eq!(set.referenced_objects(), [buffer.erase()]);
    }

    #[test]
    fn out_of_bounds_write_applies_nothing() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let set = allocate(&mut graph, vec![uniform_binding(0, 3)], 1)[0];
        let buffer = buffer(&mut graph, BufferUsage::UNIFORM_BUFFER);

        let report = graph
            .update_descriptor_sets(
                &[uniform_write(set, 0, buffer, 1), uniform_write(set, 2, buffer, 5)],
                &[],
            )
            .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkWriteDescriptorSet-dstArrayElement-00321"],
        );
        assert_eq!(
            report.first().unwrap().context,
            "descriptor_writes[1].dst_array_element",
        );
        assert_eq!(report.first().unwrap().kind(), ErrorKind::Consistency);

        // The valid first write is not applied either.
        assert!(graph.get(set).unwrap().descriptor(0, 0).is_none());
    }

    #[test]
    fn mismatched_types() {
        let mut graph = graph();
        let set = allocate(
            &mut graph,
            vec![
                uniform_binding(0, 1),
                DescriptorSetLayoutBinding::new(1, DescriptorType::StorageBuffer),
            ],
            1,
        )[0];
        let buffer = buffer(&mut graph, BufferUsage::UNIFORM_BUFFER);

        let image_data = WriteDescriptorSet::new(
            set,
            0,
            DescriptorType::UniformBuffer,
            DescriptorData::Image(vec![DescriptorImageInfo::default()]),
        );
        let wrong_type = WriteDescriptorSet {
            dst_binding: 1,
            ..uniform_write(set, 0, buffer, 1)
        };

        let report = graph
            .update_descriptor_sets(&[image_data, wrong_type], &[])
            .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkWriteDescriptorSet-descriptorType-00322",
                "VUID-VkWriteDescriptorSet-descriptorType-00319",
            ],
        );
        assert_eq!(
            report.kinds().collect::<Vec<_>>(),
            [ErrorKind::Structural, ErrorKind::Consistency],
        );
    }

    #[test]
    fn buffer_info_rules() {
        let mut graph = graph();
        let set = allocate(&mut graph, vec![uniform_binding(0, 1)], 1)[0];
        let buffer = buffer(&mut graph, BufferUsage::STORAGE_BUFFER);

        let write = WriteDescriptorSet::new(
            set,
            0,
            DescriptorType::UniformBuffer,
            DescriptorData::Buffer(vec![DescriptorBufferInfo::new(buffer, 100, WHOLE_SIZE)]),
        );
        let report = DescriptorRules::new(&graph).validate_write(&write).unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkWriteDescriptorSet-descriptorType-00330",
                "VUID-VkWriteDescriptorSet-descriptorType-00327",
            ],
        );
        assert_eq!(report.errors()[0].context, "data[0].buffer");

        let write = WriteDescriptorSet::new(
            set,
            0,
            DescriptorType::UniformBuffer,
            DescriptorData::Buffer(vec![DescriptorBufferInfo::new(buffer, 2048, 16)]),
        );
        let report = DescriptorRules::new(&graph).validate_write(&write).unwrap_err();
        assert!(report.contains("VUID-VkDescriptorBufferInfo-offset-00340"));
    }

    #[test]
    fn buffer_ranges() {
        let mut graph = graph();
        let set = allocate(&mut graph, vec![uniform_binding(0, 1)], 1)[0];
        let buffer = buffer(&mut graph, BufferUsage::UNIFORM_BUFFER);
        let rules = DescriptorRules::new(&graph);

        let write = |offset, range| {
            WriteDescriptorSet::new(
                set,
                0,
                DescriptorType::UniformBuffer,
                DescriptorData::Buffer(vec![DescriptorBufferInfo::new(buffer, offset, range)]),
            )
        };

        let report = rules.validate_write(&write(0, 0)).unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkDescriptorBufferInfo-range-00341"],
        );
        assert_eq!(report.errors()[0].context, "data[0].range");

        let report = rules.validate_write(&write(256, 1024)).unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkDescriptorBufferInfo-range-00342"],
        );

        // Ranges that end exactly at the end of the buffer.
        assert!(rules.validate_write(&write(768, 256)).is_ok());
        assert!(rules.validate_write(&write(768, WHOLE_SIZE)).is_ok());
    }

    #[test]
    fn repeated_validation_agrees() {
        let mut graph = graph();
        let set = allocate(&mut graph, vec![uniform_binding(0, 3)], 1)[0];
        let buffer = buffer(&mut graph, BufferUsage::STORAGE_BUFFER);
        let rules = DescriptorRules::new(&graph);

        let invalid = uniform_write(set, 2, buffer, 5);
        let first = rules.validate_write(&invalid).unwrap_err();
        let second = rules.validate_write(&invalid).unwrap_err();
        assert!(!first.is_empty());
        assert_eq!(first.to_string(), second.to_string());

        let uniform = self::buffer(&mut graph, BufferUsage::UNIFORM_BUFFER);
        let rules = DescriptorRules::new(&graph);
        let valid = uniform_write(set, 0, uniform, 3);
        assert!(rules.validate_write(&valid).is_ok());
        assert!(rules.validate_write(&valid).is_ok());
    }

    #[test]
    fn immutable_sampler_bindings() {
        let mut graph = graph();
        let sampler = graph.create_sampler(SamplerCreateInfo::default()).unwrap();
        let image = graph
            .create_image(ImageCreateInfo {
                format: Format::R8G8B8A8_UNORM,
                usage: ImageUsage::SAMPLED,
                extent: [64, 64, 1],
                ..Default::default()
            })
            .unwrap();
        let view = graph
            .create_image_view(ImageViewCreateInfo::from_image(image))
            .unwrap();
        let layout = graph
            .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
                bindings: vec![DescriptorSetLayoutBinding {
                    immutable_samplers: vec![sampler],
                    ..DescriptorSetLayoutBinding::new(0, DescriptorType::CombinedImageSampler)
                }],
                ..Default::default()
            })
            .unwrap();
        let pool = graph
            .create_descriptor_pool(DescriptorPoolCreateInfo {
                max_sets: 2,
                pool_sizes: [(DescriptorType::CombinedImageSampler, 2)]
                    .into_iter()
                    .collect(),
                ..Default::default()
            })
            .unwrap();
        let sets = graph
            .allocate_descriptor_sets(DescriptorSetAllocateInfo::new(pool, [layout, layout]))
            .unwrap();

        let write = |info| {
            WriteDescriptorSet::new(
                sets[0],
                0,
                DescriptorType::CombinedImageSampler,
                DescriptorData::Image(vec![info]),
            )
        };

        // Neither the image alone nor the image with a sampler may be written.
        for info in [
            DescriptorImageInfo::image_view(view, ImageLayout::ShaderReadOnlyOptimal),
            DescriptorImageInfo::combined(view, ImageLayout::ShaderReadOnlyOptimal, sampler),
        ] {
            let report = graph
                .update_descriptor_sets(&[write(info)], &[])
                .unwrap_err();
            assert!(report.contains("VUID-VkWriteDescriptorSet-descriptorType-02752"));
            assert_eq!(report.errors()[0].context, "descriptor_writes[0].dst_binding");
        }

        assert!(graph.get(sets[0]).unwrap().descriptor(0, 0).is_none());

        let report = graph
            .update_descriptor_sets(&[], &[CopyDescriptorSet::new(sets[0], sets[1])])
            .unwrap_err();
        assert!(report.contains("VUID-VkCopyDescriptorSet-dstBinding-02753"));
    }

    #[test]
    fn combined_write_without_sampler() {
        let mut graph = graph();
        let image = graph
            .create_image(ImageCreateInfo {
                format: Format::R8G8B8A8_UNORM,
                usage: ImageUsage::SAMPLED,
                extent: [64, 64, 1],
                ..Default::default()
            })
            .unwrap();
        let view = graph
            .create_image_view(ImageViewCreateInfo::from_image(image))
            .unwrap();
        let set = allocate(
            &mut graph,
            vec![DescriptorSetLayoutBinding::new(
                0,
                DescriptorType::CombinedImageSampler,
            )],
            1,
        )[0];

        let report = graph
            .update_descriptor_sets(
                &[WriteDescriptorSet::new(
                    set,
                    0,
                    DescriptorType::CombinedImageSampler,
                    DescriptorData::Image(vec![DescriptorImageInfo::image_view(
                        view,
                        ImageLayout::ShaderReadOnlyOptimal,
                    )]),
                )],
                &[],
            )
            .unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkWriteDescriptorSet-descriptorType-00325"],
        );
        assert_eq!(report.errors()[0].context, "descriptor_writes[0].data[0].sampler");
    }

    #[test]
    fn copies_carry_resources() {
        let mut graph = graph();
        let sets = allocate(&mut graph, vec![uniform_binding(0, 2)], 2);
        let (a, b) = (sets[0], sets[1]);
        let buffer = buffer(&mut graph, BufferUsage::UNIFORM_BUFFER);

        graph
            .update_descriptor_sets(
                &[uniform_write(a, 0, buffer, 1)],
                &[CopyDescriptorSet {
                    dst_array_element: 1,
                    ..CopyDescriptorSet::new(a, b)
                }],
            )
            .unwrap();

        let written = *graph.get(a).unwrap().descriptor(0, 0).unwrap();
        assert_eq!(graph.get(b).unwrap().descriptor(0, 1), Some(&written));
        assert_eq!(graph.get(b).unwrap().referenced_objects(), [buffer.erase()]);

        let report = graph
            .update_descriptor_sets(&[], &[CopyDescriptorSet::new(a, a)])
            .unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkCopyDescriptorSet-srcSet-00349"],
        );
        assert_eq!(report.errors()[0].context, "descriptor_copies[0]");
    }

    #[test]
    fn copy_bounds() {
        let mut graph = graph();
        let sets = allocate(&mut graph, vec![uniform_binding(0, 2)], 2);

        let report = DescriptorRules::new(&graph)
            .validate_copy(&CopyDescriptorSet {
                src_array_element: 1,
                dst_binding: 3,
                descriptor_count: 2,
                ..CopyDescriptorSet::new(sets[0], sets[1])
            })
            .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkCopyDescriptorSet-dstBinding-00347"],
        );

        let report = DescriptorRules::new(&graph)
            .validate_copy(&CopyDescriptorSet {
                src_array_element: 1,
                descriptor_count: 2,
                ..CopyDescriptorSet::new(sets[0], sets[1])
            })
            .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkCopyDescriptorSet-srcArrayElement-00346"],
        );
    }

    #[test]
    fn update_while_recording() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let set = allocate(&mut graph, vec![uniform_binding(0, 1)], 1)[0];
        let buffer = buffer(&mut graph, BufferUsage::UNIFORM_BUFFER);

        let sequence = graph.begin_sequence();
        graph.bind_descriptor_set(sequence, set).unwrap();

        let report = graph
            .update_descriptor_sets(&[uniform_write(set, 0, buffer, 1)], &[])
            .unwrap_err();

        assert!(report.contains("VUID-vkUpdateDescriptorSets-None-03047"));
        assert_eq!(report.first().unwrap().kind(), ErrorKind::ResourceInUse);
    }
}
