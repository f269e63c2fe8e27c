// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Describes the layout of all descriptors within a descriptor set.
//!
//! When creating a new descriptor set, you must provide a *layout* object to create it from.

use crate::{
    image::ImageLayout, report::Halt, sampler::Sampler, ErrorKind, Id, ObjectGraph, Requires,
    RequiresAllOf, RequiresOneOf, ValidationError, ValidationReport,
};
use foldhash::{HashMap, HashSet};
use std::ops::Range;

/// Rule ID of a layout or allocation whose descriptors cannot all be numbered with a `u32`.
pub const DESCRIPTOR_COUNT_OVERFLOW: &str = "UNASSIGNED-DescriptorSet-descriptor-count-overflow";

vulkan_bitflags! {
    #[non_exhaustive]

    /// Describes which shader stages have access to a descriptor.
    ShaderStages = ShaderStageFlags(u32);

    /// The vertex shader stage.
    VERTEX = VERTEX,

    /// The tessellation control shader stage.
    TESSELLATION_CONTROL = TESSELLATION_CONTROL,

    /// The tessellation evaluation shader stage.
    TESSELLATION_EVALUATION = TESSELLATION_EVALUATION,

    /// The geometry shader stage.
    GEOMETRY = GEOMETRY,

    /// The fragment shader stage.
    FRAGMENT = FRAGMENT,

    /// The compute shader stage.
    COMPUTE = COMPUTE,

    /// The task shader stage.
    TASK = TASK_EXT
    RequiresOneOf([
        RequiresAllOf([DeviceExtension(ext_mesh_shader)]),
        RequiresAllOf([DeviceExtension(nv_mesh_shader)]),
    ]),

    /// The mesh shader stage.
    MESH = MESH_EXT
    RequiresOneOf([
        RequiresAllOf([DeviceExtension(ext_mesh_shader)]),
        RequiresAllOf([DeviceExtension(nv_mesh_shader)]),
    ]),
}

vulkan_bitflags! {
    #[non_exhaustive]

    /// Flags that control how a descriptor set layout is created.
    DescriptorSetLayoutCreateFlags = DescriptorSetLayoutCreateFlags(u32);

    /// Whether descriptor sets using this descriptor set layout must be allocated from a
    /// descriptor pool whose flags contain [`DescriptorPoolCreateFlags::UPDATE_AFTER_BIND`].
    ///
    /// This flag must be specified whenever the layout contains one or more bindings that have
    /// the [`DescriptorBindingFlags::UPDATE_AFTER_BIND`] flag.
    ///
    /// [`DescriptorPoolCreateFlags::UPDATE_AFTER_BIND`]: super::pool::DescriptorPoolCreateFlags::UPDATE_AFTER_BIND
    UPDATE_AFTER_BIND_POOL = UPDATE_AFTER_BIND_POOL
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_2)]),
        RequiresAllOf([DeviceExtension(ext_descriptor_indexing)]),
    ]),

    /// Whether the descriptor set layout should be created for push descriptors.
    ///
    /// If set, the layout can only be used for push descriptors, and no descriptor sets can be
    /// allocated with it.
    PUSH_DESCRIPTOR = PUSH_DESCRIPTOR_KHR
    RequiresOneOf([
        RequiresAllOf([DeviceExtension(khr_push_descriptor)]),
    ]),

    /// Whether descriptor sets using this layout must be allocated from a host-only descriptor
    /// pool. Such sets can only be updated and copied from, never bound.
    HOST_ONLY_POOL = HOST_ONLY_POOL_EXT
    RequiresOneOf([
        RequiresAllOf([DeviceExtension(ext_mutable_descriptor_type)]),
        RequiresAllOf([DeviceExtension(valve_mutable_descriptor_type)]),
    ]),
}

vulkan_bitflags! {
    #[non_exhaustive]

    /// Flags that control how a binding in a descriptor set layout is created.
    DescriptorBindingFlags = DescriptorBindingFlags(u32);

    /// Allows descriptors in this binding to be updated after a command buffer has already
    /// recorded a bind command containing a descriptor set with this layout, as long as the
    /// command buffer is not executing.
    UPDATE_AFTER_BIND = UPDATE_AFTER_BIND
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_2)]),
        RequiresAllOf([DeviceExtension(ext_descriptor_indexing)]),
    ]),

    /// Allows descriptors in this binding to be updated while a command buffer using them is
    /// pending, as long as the descriptors are not dynamically used by the shaders.
    UPDATE_UNUSED_WHILE_PENDING = UPDATE_UNUSED_WHILE_PENDING
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_2)]),
        RequiresAllOf([DeviceExtension(ext_descriptor_indexing)]),
    ]),

    /// Allows descriptors to be left empty or invalid even if they are statically used by a
    /// shader, as long as the shader does not dynamically access them.
    PARTIALLY_BOUND = PARTIALLY_BOUND
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_2)]),
        RequiresAllOf([DeviceExtension(ext_descriptor_indexing)]),
    ]),

    /// Whether the binding has a variable number of descriptors. The number of descriptors given
    /// in the layout is then an upper bound, and the actual number is chosen when a descriptor
    /// set is allocated. Only the binding with the highest binding number can have this flag.
    VARIABLE_DESCRIPTOR_COUNT = VARIABLE_DESCRIPTOR_COUNT
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_2)]),
        RequiresAllOf([DeviceExtension(ext_descriptor_indexing)]),
    ]),
}

vulkan_enum! {
    #[non_exhaustive]

    /// Describes what kind of resource may later be bound to a descriptor.
    DescriptorType = DescriptorType(i32);

    /// Describes how a `SampledImage` descriptor should be read.
    Sampler = SAMPLER,

    /// Combines `SampledImage` and `Sampler` in one descriptor.
    CombinedImageSampler = COMBINED_IMAGE_SAMPLER,

    /// Gives read-only access to an image via a sampler. The image must be combined with a
    /// sampler inside the shader.
    SampledImage = SAMPLED_IMAGE,

    /// Gives read and/or write access to individual pixels in an image.
    StorageImage = STORAGE_IMAGE,

    /// Gives read-only access to the content of a buffer, interpreted as an array of texel data.
    UniformTexelBuffer = UNIFORM_TEXEL_BUFFER,

    /// Gives read and/or write access to the content of a buffer, interpreted as an array of
    /// texel data.
    StorageTexelBuffer = STORAGE_TEXEL_BUFFER,

    /// Gives read-only access to the content of a buffer, interpreted as a structure.
    UniformBuffer = UNIFORM_BUFFER,

    /// Gives read and/or write access to the content of a buffer, interpreted as a structure.
    StorageBuffer = STORAGE_BUFFER,

    /// As `UniformBuffer`, but the offset within the buffer is specified at the time the
    /// descriptor set is bound.
    UniformBufferDynamic = UNIFORM_BUFFER_DYNAMIC,

    /// As `StorageBuffer`, but the offset within the buffer is specified at the time the
    /// descriptor set is bound.
    StorageBufferDynamic = STORAGE_BUFFER_DYNAMIC,

    /// Gives access to an image inside a fragment shader via a render pass. You can only access
    /// the pixel that is currently being processed by the fragment shader.
    InputAttachment = INPUT_ATTACHMENT,

    /// Data written directly into the descriptor set, which is read like a uniform buffer.
    ///
    /// The descriptor count of such a binding is a number of bytes, and so are the array
    /// elements and counts of writes and copies that touch it. These values must always be a
    /// multiple of 4.
    InlineUniformBlock = INLINE_UNIFORM_BLOCK
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_3)]),
        RequiresAllOf([DeviceExtension(ext_inline_uniform_block)]),
    ]),

    /// A descriptor that can hold any of the types listed in the
    /// [`mutable_descriptor_types`](DescriptorSetLayoutBinding::mutable_descriptor_types) of its
    /// binding. The type is chosen anew by every write.
    Mutable = MUTABLE_EXT
    RequiresOneOf([
        RequiresAllOf([DeviceExtension(ext_mutable_descriptor_type)]),
        RequiresAllOf([DeviceExtension(valve_mutable_descriptor_type)]),
    ]),
}

impl DescriptorType {
    /// Returns whether the offset of the descriptor is specified when the set is bound.
    #[inline]
    pub fn is_dynamic(self) -> bool {
        matches!(
            self,
            DescriptorType::UniformBufferDynamic | DescriptorType::StorageBufferDynamic,
        )
    }

    /// Returns the image layout that descriptors of this type are usually written with, or
    /// `ImageLayout::Undefined` if the type holds no image.
    pub fn default_image_layout(self) -> ImageLayout {
        match self {
            DescriptorType::CombinedImageSampler
            | DescriptorType::SampledImage
            | DescriptorType::InputAttachment => ImageLayout::ShaderReadOnlyOptimal,
            DescriptorType::StorageImage => ImageLayout::General,
            DescriptorType::Sampler
            | DescriptorType::UniformTexelBuffer
            | DescriptorType::StorageTexelBuffer
            | DescriptorType::UniformBuffer
            | DescriptorType::StorageBuffer
            | DescriptorType::UniformBufferDynamic
            | DescriptorType::StorageBufferDynamic
            | DescriptorType::InlineUniformBlock
            | DescriptorType::Mutable => ImageLayout::Undefined,
        }
    }
}

/// Parameters to create a new `DescriptorSetLayout`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorSetLayoutCreateInfo {
    /// Specifies how to create the descriptor set layout.
    ///
    /// The default value is empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: DescriptorSetLayoutCreateFlags,

    /// The bindings of the descriptor set layout. Each binding number may appear only once.
    ///
    /// The default value is empty.
    pub bindings: Vec<DescriptorSetLayoutBinding>,

    #[cfg_attr(feature = "serde", serde(skip))]
    pub _ne: crate::NonExhaustive,
}

impl Default for DescriptorSetLayoutCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            flags: DescriptorSetLayoutCreateFlags::empty(),
            bindings: Vec::new(),
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl DescriptorSetLayoutCreateInfo {
    pub(crate) fn validate(
        &self,
        graph: &ObjectGraph,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let &Self {
            flags,
            ref bindings,
            _ne: _,
        } = self;

        let capabilities = graph.capabilities();

        report.check(flags.validate_capabilities(capabilities).map_err(|err| {
            err.add_context("flags")
                .set_vuids(&["VUID-VkDescriptorSetLayoutCreateInfo-flags-parameter"])
        }))?;

        if flags.contains(
            DescriptorSetLayoutCreateFlags::HOST_ONLY_POOL
                | DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL,
        ) {
            report.push(Box::new(ValidationError {
                context: "flags".into(),
                problem: "contains both `DescriptorSetLayoutCreateFlags::HOST_ONLY_POOL` and \
                    `DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL`"
                    .into(),
                vuids: &["VUID-VkDescriptorSetLayoutCreateInfo-flags-04590"],
                ..Default::default()
            }))?;
        }

        if flags.contains(
            DescriptorSetLayoutCreateFlags::HOST_ONLY_POOL
                | DescriptorSetLayoutCreateFlags::PUSH_DESCRIPTOR,
        ) {
            report.push(Box::new(ValidationError {
                context: "flags".into(),
                problem: "contains both `DescriptorSetLayoutCreateFlags::HOST_ONLY_POOL` and \
                    `DescriptorSetLayoutCreateFlags::PUSH_DESCRIPTOR`"
                    .into(),
                vuids: &["VUID-VkDescriptorSetLayoutCreateInfo-flags-04591"],
                ..Default::default()
            }))?;
        }

        let mut seen = HashSet::default();

        for (index, binding) in bindings.iter().enumerate() {
            if !seen.insert(binding.binding) {
                report.push(Box::new(ValidationError {
                    context: format!("bindings[{}].binding", index).into(),
                    problem: format!(
                        "is {}, which is also the number of an earlier binding",
                        binding.binding,
                    )
                    .into(),
                    vuids: &["VUID-VkDescriptorSetLayoutCreateInfo-binding-00279"],
                    kind: ErrorKind::Structural,
                    ..Default::default()
                }))?;
            }
        }

        let highest_binding_num = bindings.iter().map(|binding| binding.binding).max();
        let mut total_descriptor_count: u64 = 0;
        let mut update_after_bind_binding = None;
        let mut buffer_dynamic_binding = None;

        for (index, binding) in bindings.iter().enumerate() {
            report.scope(format!("bindings[{}]", index), |report| {
                binding.validate(graph, report)?;
                binding.validate_layout_flags(flags, report)
            })?;

            let &DescriptorSetLayoutBinding {
                binding: binding_num,
                binding_flags,
                descriptor_type,
                descriptor_count,
                ..
            } = binding;

            total_descriptor_count += u64::from(descriptor_count);

            if binding_flags.intersects(DescriptorBindingFlags::VARIABLE_DESCRIPTOR_COUNT)
                && Some(binding_num) != highest_binding_num
            {
                report.push(Box::new(ValidationError {
                    problem: format!(
                        "`bindings[{}].binding_flags` contains \
                        `DescriptorBindingFlags::VARIABLE_DESCRIPTOR_COUNT`, but {} is not the \
                        highest binding number in `bindings`",
                        index, binding_num,
                    )
                    .into(),
                    vuids: &[
                        "VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-pBindingFlags-03004",
                    ],
                    ..Default::default()
                }))?;
            }

            if binding_flags.intersects(DescriptorBindingFlags::UPDATE_AFTER_BIND) {
                update_after_bind_binding.get_or_insert(index);
            }

            if descriptor_type.is_dynamic() {
                buffer_dynamic_binding.get_or_insert(index);
            }
        }

        // Every descriptor gets one slot, indexed by `u32`.
        if total_descriptor_count > u64::from(u32::MAX) {
            report.push(Box::new(ValidationError {
                context: "bindings".into(),
                problem: "the sum of `descriptor_count` over all elements is greater than \
                    `u32::MAX`"
                    .into(),
                vuids: &[DESCRIPTOR_COUNT_OVERFLOW],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        if flags.intersects(DescriptorSetLayoutCreateFlags::PUSH_DESCRIPTOR)
            && total_descriptor_count > capabilities.device_limit("max_push_descriptors")
        {
            report.push(Box::new(ValidationError {
                problem: "`flags` contains `DescriptorSetLayoutCreateFlags::PUSH_DESCRIPTOR`, and \
                    the total number of descriptors in `bindings` exceeds the \
                    `max_push_descriptors` limit"
                    .into(),
                vuids: &["VUID-VkDescriptorSetLayoutCreateInfo-flags-00281"],
                ..Default::default()
            }))?;
        }

        if let (Some(update_after_bind_binding), Some(buffer_dynamic_binding)) =
            (update_after_bind_binding, buffer_dynamic_binding)
        {
            report.push(Box::new(ValidationError {
                problem: format!(
                    "`bindings[{}].binding_flags` contains \
                    `DescriptorBindingFlags::UPDATE_AFTER_BIND`, and \
                    `bindings[{}].descriptor_type` is `DescriptorType::UniformBufferDynamic` or \
                    `DescriptorType::StorageBufferDynamic`",
                    update_after_bind_binding, buffer_dynamic_binding,
                )
                .into(),
                vuids: &["VUID-VkDescriptorSetLayoutCreateInfo-descriptorType-03001"],
                ..Default::default()
            }))?;
        }

        Ok(())
    }
}

/// A binding in a descriptor set layout.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorSetLayoutBinding {
    /// The binding number, which shaders use to refer to the binding.
    ///
    /// The default value is `0`.
    pub binding: u32,

    /// Specifies how to create the binding.
    ///
    /// The default value is empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub binding_flags: DescriptorBindingFlags,

    /// The content and layout of each array element of a binding.
    ///
    /// There is no default value.
    pub descriptor_type: DescriptorType,

    /// How many descriptors (array elements) this binding is made of. A binding with zero
    /// descriptors is reserved but unused.
    ///
    /// If `descriptor_type` is [`DescriptorType::InlineUniformBlock`], then this value instead
    /// specifies the number of bytes available in the inline uniform block, and must be a
    /// multiple of 4.
    ///
    /// The default value is `1`.
    pub descriptor_count: u32,

    /// Which shader stages are going to access the descriptors in this binding.
    ///
    /// The default value is [`ShaderStages::empty()`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub stages: ShaderStages,

    /// Samplers that are included as a fixed part of the descriptor set layout.
    ///
    /// The list must be either empty, or contain exactly `descriptor_count` samplers. It can
    /// only be non-empty if `descriptor_type` is [`DescriptorType::Sampler`] or
    /// [`DescriptorType::CombinedImageSampler`].
    ///
    /// The default value is empty.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub immutable_samplers: Vec<Id<Sampler>>,

    /// If `descriptor_type` is [`DescriptorType::Mutable`], the types that the descriptors of
    /// this binding can take. Must otherwise be empty.
    ///
    /// The default value is empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mutable_descriptor_types: Vec<DescriptorType>,

    #[cfg_attr(feature = "serde", serde(skip))]
    pub _ne: crate::NonExhaustive,
}

impl DescriptorSetLayoutBinding {
    /// Returns a `DescriptorSetLayoutBinding` with the given number and type.
    #[inline]
    pub fn new(binding: u32, descriptor_type: DescriptorType) -> Self {
        Self {
            binding,
            binding_flags: DescriptorBindingFlags::empty(),
            descriptor_type,
            descriptor_count: 1,
            stages: ShaderStages::empty(),
            immutable_samplers: Vec::new(),
            mutable_descriptor_types: Vec::new(),
            _ne: crate::NonExhaustive(()),
        }
    }

    pub(crate) fn validate(
        &self,
        graph: &ObjectGraph,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let &Self {
            binding: _,
            binding_flags,
            descriptor_type,
            descriptor_count,
            stages,
            ref immutable_samplers,
            ref mutable_descriptor_types,
            _ne: _,
        } = self;

        let capabilities = graph.capabilities();

        report.check(binding_flags.validate_capabilities(capabilities).map_err(|err| {
            err.add_context("binding_flags").set_vuids(&[
                "VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-pBindingFlags-parameter",
            ])
        }))?;

        report.check(descriptor_type.validate_capabilities(capabilities).map_err(|err| {
            err.add_context("descriptor_type")
                .set_vuids(&["VUID-VkDescriptorSetLayoutBinding-descriptorType-parameter"])
        }))?;

        if descriptor_type == DescriptorType::InlineUniformBlock {
            if !capabilities.is_feature_enabled("inline_uniform_block") {
                report.push(Box::new(ValidationError {
                    context: "descriptor_type".into(),
                    problem: "is `DescriptorType::InlineUniformBlock`".into(),
                    requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                        "inline_uniform_block",
                    )])]),
                    vuids: &["VUID-VkDescriptorSetLayoutBinding-descriptorType-04604"],
                    ..Default::default()
                }))?;
            }

            if descriptor_count % 4 != 0 {
                report.push(Box::new(ValidationError {
                    problem: "`descriptor_type` is `DescriptorType::InlineUniformBlock`, and \
                        `descriptor_count` is not a multiple of 4"
                        .into(),
                    vuids: &["VUID-VkDescriptorSetLayoutBinding-descriptorType-02209"],
                    ..Default::default()
                }))?;
            }

            if u64::from(descriptor_count)
                > capabilities.device_limit("max_inline_uniform_block_size")
            {
                report.push(Box::new(ValidationError {
                    problem: "`descriptor_type` is `DescriptorType::InlineUniformBlock`, and \
                        `descriptor_count` is greater than the `max_inline_uniform_block_size` \
                        limit"
                        .into(),
                    vuids: &["VUID-VkDescriptorSetLayoutBinding-descriptorType-08004"],
                    ..Default::default()
                }))?;
            }
        }

        if descriptor_count != 0 {
            report.check(stages.validate_capabilities(capabilities).map_err(|err| {
                err.add_context("stages")
                    .set_vuids(&["VUID-VkDescriptorSetLayoutBinding-descriptorCount-00283"])
            }))?;

            if descriptor_type == DescriptorType::InputAttachment
                && !(stages.is_empty() || stages == ShaderStages::FRAGMENT)
            {
                report.push(Box::new(ValidationError {
                    problem: "`descriptor_type` is `DescriptorType::InputAttachment`, but \
                        `stages` is not either empty or equal to `ShaderStages::FRAGMENT`"
                        .into(),
                    vuids: &["VUID-VkDescriptorSetLayoutBinding-descriptorType-01510"],
                    ..Default::default()
                }))?;
            }
        }

        if !immutable_samplers.is_empty() {
            if descriptor_type == DescriptorType::Mutable {
                report.push(Box::new(ValidationError {
                    problem: "`descriptor_type` is `DescriptorType::Mutable`, but \
                        `immutable_samplers` is not empty"
                        .into(),
                    vuids: &["VUID-VkDescriptorSetLayoutBinding-descriptorType-04605"],
                    ..Default::default()
                }))?;
            } else if !matches!(
                descriptor_type,
                DescriptorType::Sampler | DescriptorType::CombinedImageSampler
            ) {
                report.push(Box::new(ValidationError {
                    problem: "`immutable_samplers` is not empty, but `descriptor_type` is not \
                        `DescriptorType::Sampler` or `DescriptorType::CombinedImageSampler`"
                        .into(),
                    vuids: &["VUID-VkDescriptorSetLayoutBinding-descriptorType-00282"],
                    ..Default::default()
                }))?;
            } else if descriptor_count as usize != immutable_samplers.len() {
                report.push(Box::new(ValidationError {
                    problem: "`immutable_samplers` is not empty, but its length does not equal \
                        `descriptor_count`"
                        .into(),
                    vuids: &["VUID-VkDescriptorSetLayoutBinding-descriptorType-00282"],
                    kind: ErrorKind::Structural,
                    ..Default::default()
                }))?;
            }

            for (index, &sampler) in immutable_samplers.iter().enumerate() {
                graph.resolve(sampler, format!("immutable_samplers[{}]", index), report)?;
            }
        }

        if descriptor_type == DescriptorType::Mutable {
            self.validate_mutable_types(report)?;
        } else if !mutable_descriptor_types.is_empty() {
            report.push(Box::new(ValidationError {
                problem: "`mutable_descriptor_types` is not empty, but `descriptor_type` is not \
                    `DescriptorType::Mutable`"
                    .into(),
                vuids: &["VUID-VkMutableDescriptorTypeListEXT-descriptorTypeCount-04597"],
                ..Default::default()
            }))?;
        }

        if binding_flags.intersects(DescriptorBindingFlags::UPDATE_AFTER_BIND) {
            let required_feature: Option<(&str, RequiresOneOf, &'static [&'static str])> =
                match descriptor_type {
                    DescriptorType::UniformBuffer => Some((
                        "descriptor_binding_uniform_buffer_update_after_bind",
                        RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                            "descriptor_binding_uniform_buffer_update_after_bind",
                        )])]),
                        &["VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-descriptorBindingUniformBufferUpdateAfterBind-03005"],
                    )),
                    DescriptorType::Sampler
                    | DescriptorType::CombinedImageSampler
                    | DescriptorType::SampledImage => Some((
                        "descriptor_binding_sampled_image_update_after_bind",
                        RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                            "descriptor_binding_sampled_image_update_after_bind",
                        )])]),
                        &["VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-descriptorBindingSampledImageUpdateAfterBind-03006"],
                    )),
                    DescriptorType::StorageImage => Some((
                        "descriptor_binding_storage_image_update_after_bind",
                        RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                            "descriptor_binding_storage_image_update_after_bind",
                        )])]),
                        &["VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-descriptorBindingStorageImageUpdateAfterBind-03007"],
                    )),
                    DescriptorType::StorageBuffer => Some((
                        "descriptor_binding_storage_buffer_update_after_bind",
                        RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                            "descriptor_binding_storage_buffer_update_after_bind",
                        )])]),
                        &["VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-descriptorBindingStorageBufferUpdateAfterBind-03008"],
                    )),
                    DescriptorType::UniformTexelBuffer => Some((
                        "descriptor_binding_uniform_texel_buffer_update_after_bind",
                        RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                            "descriptor_binding_uniform_texel_buffer_update_after_bind",
                        )])]),
                        &["VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-descriptorBindingUniformTexelBufferUpdateAfterBind-03009"],
                    )),
                    DescriptorType::StorageTexelBuffer => Some((
                        "descriptor_binding_storage_texel_buffer_update_after_bind",
                        RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                            "descriptor_binding_storage_texel_buffer_update_after_bind",
                        )])]),
                        &["VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-descriptorBindingStorageTexelBufferUpdateAfterBind-03010"],
                    )),
                    DescriptorType::InlineUniformBlock => Some((
                        "descriptor_binding_inline_uniform_block_update_after_bind",
                        RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                            "descriptor_binding_inline_uniform_block_update_after_bind",
                        )])]),
                        &["VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-descriptorBindingInlineUniformBlockUpdateAfterBind-02211"],
                    )),
                    DescriptorType::InputAttachment
                    | DescriptorType::UniformBufferDynamic
                    | DescriptorType::StorageBufferDynamic => {
                        report.push(Box::new(ValidationError {
                            problem: "`binding_flags` contains \
                                `DescriptorBindingFlags::UPDATE_AFTER_BIND`, and \
                                `descriptor_type` is `DescriptorType::InputAttachment`, \
                                `DescriptorType::UniformBufferDynamic` or \
                                `DescriptorType::StorageBufferDynamic`"
                                .into(),
                            vuids: &[
                                "VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-None-03011",
                            ],
                            ..Default::default()
                        }))?;

                        None
                    }
                    DescriptorType::Mutable => None,
                };

            if let Some((feature, requires_one_of, vuids)) = required_feature {
                if !capabilities.is_feature_enabled(feature) {
                    report.push(Box::new(ValidationError {
                        problem: format!(
                            "`binding_flags` contains `DescriptorBindingFlags::UPDATE_AFTER_BIND`, \
                            and `descriptor_type` is `DescriptorType::{:?}`",
                            descriptor_type,
                        )
                        .into(),
                        requires_one_of,
                        vuids,
                        ..Default::default()
                    }))?;
                }
            }
        }

        if binding_flags.intersects(DescriptorBindingFlags::UPDATE_UNUSED_WHILE_PENDING)
            && !capabilities.is_feature_enabled("descriptor_binding_update_unused_while_pending")
        {
            report.push(Box::new(ValidationError {
                context: "binding_flags".into(),
                problem: "contains `DescriptorBindingFlags::UPDATE_UNUSED_WHILE_PENDING`".into(),
                requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                    "descriptor_binding_update_unused_while_pending",
                )])]),
                vuids: &["VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-descriptorBindingUpdateUnusedWhilePending-03012"],
                ..Default::default()
            }))?;
        }

        if binding_flags.intersects(DescriptorBindingFlags::PARTIALLY_BOUND)
            && !capabilities.is_feature_enabled("descriptor_binding_partially_bound")
        {
            report.push(Box::new(ValidationError {
                context: "binding_flags".into(),
                problem: "contains `DescriptorBindingFlags::PARTIALLY_BOUND`".into(),
                requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                    "descriptor_binding_partially_bound",
                )])]),
                vuids: &["VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-descriptorBindingPartiallyBound-03013"],
                ..Default::default()
            }))?;
        }

        if binding_flags.intersects(DescriptorBindingFlags::VARIABLE_DESCRIPTOR_COUNT) {
            if !capabilities.is_feature_enabled("descriptor_binding_variable_descriptor_count") {
                report.push(Box::new(ValidationError {
                    context: "binding_flags".into(),
                    problem: "contains `DescriptorBindingFlags::VARIABLE_DESCRIPTOR_COUNT`"
                        .into(),
                    requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
                        "descriptor_binding_variable_descriptor_count",
                    )])]),
                    vuids: &["VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-descriptorBindingVariableDescriptorCount-03014"],
                    ..Default::default()
                }))?;
            }

            if descriptor_type.is_dynamic() {
                report.push(Box::new(ValidationError {
                    problem: "`binding_flags` contains \
                        `DescriptorBindingFlags::VARIABLE_DESCRIPTOR_COUNT`, and \
                        `descriptor_type` is `DescriptorType::UniformBufferDynamic` or \
                        `DescriptorType::StorageBufferDynamic`"
                        .into(),
                    vuids: &[
                        "VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-pBindingFlags-03015",
                    ],
                    ..Default::default()
                }))?;
            }
        }

        Ok(())
    }

    /// Checks the rules that tie the binding to the flags of the layout it is part of.
    pub(crate) fn validate_layout_flags(
        &self,
        layout_flags: DescriptorSetLayoutCreateFlags,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let &Self {
            binding_flags,
            descriptor_type,
            ..
        } = self;

        if layout_flags.intersects(DescriptorSetLayoutCreateFlags::PUSH_DESCRIPTOR) {
            if matches!(
                descriptor_type,
                DescriptorType::UniformBufferDynamic
                    | DescriptorType::StorageBufferDynamic
                    | DescriptorType::InlineUniformBlock
            ) {
                report.push(Box::new(ValidationError {
                    problem: "the layout flags contain \
                        `DescriptorSetLayoutCreateFlags::PUSH_DESCRIPTOR`, and `descriptor_type` \
                        is `DescriptorType::UniformBufferDynamic`, \
                        `DescriptorType::StorageBufferDynamic` or \
                        `DescriptorType::InlineUniformBlock`"
                        .into(),
                    vuids: &[
                        "VUID-VkDescriptorSetLayoutCreateInfo-flags-00280",
                        "VUID-VkDescriptorSetLayoutCreateInfo-flags-02208",
                    ],
                    ..Default::default()
                }))?;
            }

            if descriptor_type == DescriptorType::Mutable {
                report.push(Box::new(ValidationError {
                    problem: "the layout flags contain \
                        `DescriptorSetLayoutCreateFlags::PUSH_DESCRIPTOR`, and `descriptor_type` \
                        is `DescriptorType::Mutable`"
                        .into(),
                    vuids: &["VUID-VkDescriptorSetLayoutCreateInfo-flags-04592"],
                    ..Default::default()
                }))?;
            }

            if binding_flags.intersects(
                DescriptorBindingFlags::UPDATE_AFTER_BIND
                    | DescriptorBindingFlags::UPDATE_UNUSED_WHILE_PENDING
                    | DescriptorBindingFlags::VARIABLE_DESCRIPTOR_COUNT,
            ) {
                report.push(Box::new(ValidationError {
                    problem: "the layout flags contain \
                        `DescriptorSetLayoutCreateFlags::PUSH_DESCRIPTOR`, and `binding_flags` \
                        contains `DescriptorBindingFlags::UPDATE_AFTER_BIND`, \
                        `DescriptorBindingFlags::UPDATE_UNUSED_WHILE_PENDING` or \
                        `DescriptorBindingFlags::VARIABLE_DESCRIPTOR_COUNT`"
                        .into(),
                    vuids: &["VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-flags-03003"],
                    ..Default::default()
                }))?;
            }
        }

        if binding_flags.intersects(DescriptorBindingFlags::UPDATE_AFTER_BIND)
            && !layout_flags.intersects(DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL)
        {
            report.push(Box::new(ValidationError {
                problem: "`binding_flags` contains `DescriptorBindingFlags::UPDATE_AFTER_BIND`, \
                    but the layout flags do not contain \
                    `DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL`"
                    .into(),
                vuids: &["VUID-VkDescriptorSetLayoutCreateInfo-flags-03000"],
                ..Default::default()
            }))?;
        }

        Ok(())
    }

    fn validate_mutable_types(&self, report: &mut ValidationReport) -> Result<(), Halt> {
        let types = &self.mutable_descriptor_types;

        if types.is_empty() {
            report.push(Box::new(ValidationError {
                problem: "`descriptor_type` is `DescriptorType::Mutable`, but \
                    `mutable_descriptor_types` is empty"
                    .into(),
                vuids: &["VUID-VkDescriptorSetLayoutCreateInfo-pBindings-07303"],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        for (index, &descriptor_type) in types.iter().enumerate() {
            let vuids: &'static [&'static str] = match descriptor_type {
                DescriptorType::Mutable => {
                    &["VUID-VkMutableDescriptorTypeListEXT-pDescriptorTypes-04598"]
                }
                DescriptorType::UniformBufferDynamic => {
                    &["VUID-VkMutableDescriptorTypeListEXT-pDescriptorTypes-04599"]
                }
                DescriptorType::StorageBufferDynamic => {
                    &["VUID-VkMutableDescriptorTypeListEXT-pDescriptorTypes-04600"]
                }
                DescriptorType::InlineUniformBlock => {
                    &["VUID-VkMutableDescriptorTypeListEXT-pDescriptorTypes-04601"]
                }
                _ => {
                    if types[..index].contains(&descriptor_type) {
                        report.push(Box::new(ValidationError {
                            context: format!("mutable_descriptor_types[{}]", index).into(),
                            problem: format!(
                                "is `DescriptorType::{:?}`, which appears earlier in the list",
                                descriptor_type,
                            )
                            .into(),
                            vuids: &["VUID-VkMutableDescriptorTypeListEXT-pDescriptorTypes-04602"],
                            ..Default::default()
                        }))?;
                    }

                    continue;
                }
            };

            report.push(Box::new(ValidationError {
                context: format!("mutable_descriptor_types[{}]", index).into(),
                problem: format!(
                    "is `DescriptorType::{:?}`, which a mutable descriptor cannot take",
                    descriptor_type,
                )
                .into(),
                vuids,
                ..Default::default()
            }))?;
        }

        Ok(())
    }
}

/// Describes the layout of all descriptors within a descriptor set.
#[derive(Debug)]
pub struct DescriptorSetLayout {
    flags: DescriptorSetLayoutCreateFlags,
    bindings: Vec<DescriptorSetLayoutBinding>,
    slot_table: DescriptorSlotTable,
    descriptor_counts: HashMap<DescriptorType, u32>,
}

impl DescriptorSetLayout {
    pub(crate) fn new(create_info: DescriptorSetLayoutCreateInfo) -> Self {
        let DescriptorSetLayoutCreateInfo {
            flags,
            mut bindings,
            _ne: _,
        } = create_info;

        bindings.sort_unstable_by_key(|binding| binding.binding);

        let mut descriptor_counts = HashMap::default();

        for binding in &bindings {
            if binding.descriptor_count != 0 {
                *descriptor_counts.entry(binding.descriptor_type).or_default() +=
                    binding.descriptor_count;
            }
        }

        DescriptorSetLayout {
            flags,
            slot_table: DescriptorSlotTable::new(&bindings),
            bindings,
            descriptor_counts,
        }
    }

    /// Returns the flags that the descriptor set layout was created with.
    #[inline]
    pub fn flags(&self) -> DescriptorSetLayoutCreateFlags {
        self.flags
    }

    /// Returns the bindings of the descriptor set layout, ordered by binding number.
    #[inline]
    pub fn bindings(&self) -> &[DescriptorSetLayoutBinding] {
        &self.bindings
    }

    /// Returns the binding with the given number.
    #[inline]
    pub fn binding(&self, binding: u32) -> Option<&DescriptorSetLayoutBinding> {
        (self.bindings.binary_search_by_key(&binding, |b| b.binding).ok())
            .map(|index| &self.bindings[index])
    }

    /// Returns where the descriptors of each binding are stored in a descriptor set that is
    /// allocated with the maximum variable descriptor count.
    #[inline]
    pub fn slot_table(&self) -> &DescriptorSlotTable {
        &self.slot_table
    }

    /// Returns the number of descriptors of each type. A variable count binding contributes its
    /// maximum count.
    #[inline]
    pub fn descriptor_counts(&self) -> &HashMap<DescriptorType, u32> {
        &self.descriptor_counts
    }

    /// Returns whether the binding with the highest number has a variable descriptor count.
    #[inline]
    pub fn has_variable_descriptor_count(&self) -> bool {
        self.variable_binding().is_some()
    }

    /// Returns the maximum descriptor count of the variable count binding, or `0` if there is
    /// none.
    #[inline]
    pub fn variable_descriptor_count(&self) -> u32 {
        self.variable_binding().map_or(0, |binding| binding.descriptor_count)
    }

    fn variable_binding(&self) -> Option<&DescriptorSetLayoutBinding> {
        self.bindings.last().filter(|binding| {
            (binding.binding_flags).intersects(DescriptorBindingFlags::VARIABLE_DESCRIPTOR_COUNT)
        })
    }

    /// Returns the number of descriptors of each type that a set allocated with the given
    /// variable descriptor count takes up.
    pub(crate) fn descriptor_counts_with_variable(
        &self,
        variable_descriptor_count: u32,
    ) -> HashMap<DescriptorType, u32> {
        let mut counts = self.descriptor_counts.clone();

        if let Some(binding) = self.variable_binding() {
            if let Some(count) = counts.get_mut(&binding.descriptor_type) {
                *count -= binding.descriptor_count - variable_descriptor_count;
            }

            counts.retain(|_, count| *count != 0);
        }

        counts
    }
}

/// The descriptors of one binding within the flattened descriptor array of a set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingSlots {
    /// The binding number.
    pub binding: u32,

    /// The descriptor type of the binding.
    pub descriptor_type: DescriptorType,

    /// The stages of the binding.
    pub stages: ShaderStages,

    /// The binding flags of the binding.
    pub binding_flags: DescriptorBindingFlags,

    /// Whether the binding has immutable samplers.
    pub has_immutable_samplers: bool,

    /// The types a descriptor of a mutable binding can take.
    pub mutable_descriptor_types: Vec<DescriptorType>,

    /// The index of the first descriptor of the binding.
    pub first_slot: u32,

    /// The number of descriptors in the binding.
    pub descriptor_count: u32,
}

impl BindingSlots {
    /// Returns the slots of the binding.
    #[inline]
    pub fn slots(&self) -> Range<u32> {
        self.first_slot..self.first_slot + self.descriptor_count
    }
}

/// Maps `(binding, array element)` pairs onto one contiguous array of descriptor slots.
///
/// Bindings are laid out in increasing binding number order. Because a write or copy that runs
/// past the end of a binding continues with the next binding that has a nonzero descriptor count,
/// every valid update covers a contiguous range of slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptorSlotTable {
    bindings: Vec<BindingSlots>,
    slot_count: u32,
}

impl DescriptorSlotTable {
    /// Builds the table for the given bindings, which must be sorted by binding number.
    pub(crate) fn new(bindings: &[DescriptorSetLayoutBinding]) -> Self {
        let mut slot_count = 0;
        let bindings = (bindings.iter())
            .map(|binding| {
                let slots = BindingSlots {
                    binding: binding.binding,
                    descriptor_type: binding.descriptor_type,
                    stages: binding.stages,
                    binding_flags: binding.binding_flags,
                    has_immutable_samplers: !binding.immutable_samplers.is_empty(),
                    mutable_descriptor_types: binding.mutable_descriptor_types.clone(),
                    first_slot: slot_count,
                    descriptor_count: binding.descriptor_count,
                };
                slot_count += binding.descriptor_count;

                slots
            })
            .collect();

        DescriptorSlotTable {
            bindings,
            slot_count,
        }
    }

    /// Returns the same table with the variable count binding shrunk to `count` descriptors.
    pub(crate) fn with_variable_count(&self, count: u32) -> Self {
        let mut table = self.clone();

        if let Some(last) = (table.bindings.last_mut()).filter(|last| {
            (last.binding_flags).intersects(DescriptorBindingFlags::VARIABLE_DESCRIPTOR_COUNT)
        }) {
            table.slot_count -= last.descriptor_count - count;
            last.descriptor_count = count;
        }

        table
    }

    /// Returns the bindings of the table in binding number order.
    #[inline]
    pub fn bindings(&self) -> &[BindingSlots] {
        &self.bindings
    }

    /// Returns the binding with the given number.
    #[inline]
    pub fn binding(&self, binding: u32) -> Option<&BindingSlots> {
        self.position(binding).map(|index| &self.bindings[index])
    }

    /// Returns the total number of descriptor slots.
    #[inline]
    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }

    /// Returns the binding that owns `slot`.
    pub fn binding_of_slot(&self, slot: u32) -> Option<&BindingSlots> {
        (self.bindings.iter()).find(|binding| binding.slots().contains(&slot))
    }

    fn position(&self, binding: u32) -> Option<usize> {
        (self.bindings.binary_search_by_key(&binding, |b| b.binding)).ok()
    }

    /// Returns the slots covered by `count` descriptors starting at `first_element` of `binding`.
    ///
    /// If the range runs past the end of the binding, it continues at element 0 of the next
    /// binding with a nonzero descriptor count, which must have the same descriptor type, stages
    /// and use of immutable samplers. Inline uniform blocks never continue into the next binding.
    pub fn span(
        &self,
        binding: u32,
        first_element: u32,
        count: u32,
    ) -> Result<Range<u32>, SpanError> {
        let first_index = self.position(binding).ok_or(SpanError::NoSuchBinding)?;
        let first = &self.bindings[first_index];

        if first_element > first.descriptor_count {
            return Err(SpanError::OutOfBounds);
        }

        let start = first.first_slot + first_element;
        let available_here = first.descriptor_count - first_element;

        if count <= available_here {
            return Ok(start..start + count);
        }

        if first.descriptor_type == DescriptorType::InlineUniformBlock {
            return Err(SpanError::OutOfBounds);
        }

        let mut remaining = count - available_here;

        for next in self.bindings[first_index + 1..]
            .iter()
            .filter(|next| next.descriptor_count != 0)
        {
            if next.descriptor_type != first.descriptor_type || next.stages != first.stages {
                return Err(SpanError::TypeOrStagesMismatch {
                    binding: next.binding,
                });
            }

            if next.has_immutable_samplers != first.has_immutable_samplers {
                return Err(SpanError::ImmutableSamplersMismatch {
                    binding: next.binding,
                });
            }

            if remaining <= next.descriptor_count {
                return Ok(start..start + count);
            }

            remaining -= next.descriptor_count;
        }

        Err(SpanError::OutOfBounds)
    }
}

/// Error returned by [`DescriptorSlotTable::span`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanError {
    /// The starting binding does not exist.
    NoSuchBinding,

    /// The range runs past the last descriptor of the set.
    OutOfBounds,

    /// The range continues into a binding with a different descriptor type or stages.
    TypeOrStagesMismatch { binding: u32 },

    /// The range continues into a binding that differs in whether it has immutable samplers.
    ImmutableSamplersMismatch { binding: u32 },
}

impl std::fmt::Display for SpanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanError::NoSuchBinding => write!(f, "the binding does not exist in the layout"),
            SpanError::OutOfBounds => {
                write!(f, "the range runs past the last descriptor of the set")
            }
            SpanError::TypeOrStagesMismatch { binding } => write!(
                f,
                "the range continues into binding {}, which has a different descriptor type or \
                different stages",
                binding,
            ),
            SpanError::ImmutableSamplersMismatch { binding } => write!(
                f,
                "the range continues into binding {}, which differs in its use of immutable \
                samplers",
                binding,
            ),
        }
    }
}

impl std::error::Error for SpanError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CapabilitySet, ValidationMode};

    fn binding(num: u32, ty: DescriptorType, count: u32) -> DescriptorSetLayoutBinding {
        DescriptorSetLayoutBinding {
            descriptor_count: count,
            stages: ShaderStages::FRAGMENT,
            ..DescriptorSetLayoutBinding::new(num, ty)
        }
    }

    fn table(bindings: &[DescriptorSetLayoutBinding]) -> DescriptorSlotTable {
        DescriptorSlotTable::new(bindings)
    }

    #[test]
    fn span_within_binding() {
        let table = table(&[
            binding(0, DescriptorType::UniformBuffer, 3),
            binding(1, DescriptorType::SampledImage, 2),
        ]);

        assert_eq!(table.slot_count(), 5);
        assert_eq!(table.span(0, 1, 2), Ok(1..3));
        assert_eq!(table.span(1, 0, 2), Ok(3..5));
        assert_eq!(table.span(2, 0, 1), Err(SpanError::NoSuchBinding));
    }

    #[test]
    fn span_rolls_over() {
        let table = table(&[
            binding(0, DescriptorType::UniformBuffer, 3),
            binding(1, DescriptorType::UniformBuffer, 0),
            binding(2, DescriptorType::UniformBuffer, 2),
        ]);

        assert_eq!(table.span(0, 2, 3), Ok(2..5));
        assert_eq!(table.span(0, 2, 4), Err(SpanError::OutOfBounds));
    }

    #[test]
    fn span_out_of_bounds() {
        let table = table(&[binding(0, DescriptorType::UniformBuffer, 3)]);

        assert_eq!(table.span(0, 2, 5), Err(SpanError::OutOfBounds));
        assert_eq!(table.span(0, 4, 0), Err(SpanError::OutOfBounds));
        assert_eq!(table.span(0, 3, 0), Ok(3..3));
    }

    #[test]
    fn span_rejects_mismatched_rollover() {
        let table = table(&[
            binding(0, DescriptorType::UniformBuffer, 1),
            binding(1, DescriptorType::StorageBuffer, 1),
        ]);

        assert_eq!(
            table.span(0, 0, 2),
            Err(SpanError::TypeOrStagesMismatch { binding: 1 }),
        );
    }

    #[test]
    fn inline_block_does_not_roll_over() {
        let table = table(&[
            binding(0, DescriptorType::InlineUniformBlock, 16),
            binding(1, DescriptorType::InlineUniformBlock, 16),
        ]);

        assert_eq!(table.span(0, 8, 8), Ok(8..16));
        assert_eq!(table.span(0, 8, 12), Err(SpanError::OutOfBounds));
    }

    #[test]
    fn variable_count() {
        let mut last = binding(1, DescriptorType::SampledImage, 8);
        last.binding_flags = DescriptorBindingFlags::VARIABLE_DESCRIPTOR_COUNT;
        let table = table(&[binding(0, DescriptorType::Sampler, 1), last]).with_variable_count(3);

        assert_eq!(table.slot_count(), 4);
        assert_eq!(table.span(1, 0, 3), Ok(1..4));
        assert_eq!(table.span(1, 0, 4), Err(SpanError::OutOfBounds));
    }

    #[test]
    fn duplicate_binding_numbers() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let report = graph
            .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
                bindings: vec![
                    binding(0, DescriptorType::UniformBuffer, 1),
                    binding(0, DescriptorType::SampledImage, 1),
                ],
                ..Default::default()
            })
            .unwrap_err();

        assert!(report.contains("VUID-VkDescriptorSetLayoutCreateInfo-binding-00279"));
        assert_eq!(report.first().unwrap().kind(), ErrorKind::Structural);
    }

    #[test]
    fn descriptor_count_overflow() {
        let mut graph = ObjectGraph::new(CapabilitySet::new());
        let report = graph
            .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
                bindings: vec![
                    binding(0, DescriptorType::UniformBuffer, u32::MAX),
                    binding(1, DescriptorType::UniformBuffer, u32::MAX),
                ],
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(report.rule_ids().collect::<Vec<_>>(), [DESCRIPTOR_COUNT_OVERFLOW]);
        assert_eq!(report.first().unwrap().kind(), ErrorKind::Structural);

        // A single binding may use the whole range.
        let layout = graph
            .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
                bindings: vec![binding(0, DescriptorType::UniformBuffer, u32::MAX)],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(graph.get(layout).unwrap().slot_table().slot_count(), u32::MAX);
    }

    #[test]
    fn input_attachment_stages() {
        let mut graph =
            ObjectGraph::new(CapabilitySet::new()).with_mode(ValidationMode::CollectAll);
        let mut input = binding(0, DescriptorType::InputAttachment, 1);
        input.stages = ShaderStages::VERTEX | ShaderStages::FRAGMENT;

        let report = graph
            .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
                bindings: vec![input],
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(report.len(), 1);
        assert!(report.contains("VUID-VkDescriptorSetLayoutBinding-descriptorType-01510"));
    }

    #[test]
    fn inline_uniform_block_requirements() {
        let mut graph =
            ObjectGraph::new(CapabilitySet::new()).with_mode(ValidationMode::CollectAll);
        let report = graph
            .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
                bindings: vec![binding(0, DescriptorType::InlineUniformBlock, 6)],
                ..Default::default()
            })
            .unwrap_err();

        assert!(report.contains("VUID-VkDescriptorSetLayoutBinding-descriptorType-parameter"));
        assert!(report.contains("VUID-VkDescriptorSetLayoutBinding-descriptorType-04604"));
        assert!(report.contains("VUID-VkDescriptorSetLayoutBinding-descriptorType-02209"));

        let mut graph = ObjectGraph::new(
            CapabilitySet::new()
                .with_api_version(crate::Version::V1_3)
                .with_feature("inline_uniform_block"),
        );
        let layout = graph
            .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
                bindings: vec![binding(0, DescriptorType::InlineUniformBlock, 16)],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(graph.get(layout).unwrap().slot_table().slot_count(), 16);
    }

    #[test]
    fn variable_count_must_be_last() {
        let capabilities = CapabilitySet::new()
            .with_api_version(crate::Version::V1_2)
            .with_feature("descriptor_binding_variable_descriptor_count");
        let mut graph = ObjectGraph::new(capabilities);
        let mut first = binding(0, DescriptorType::SampledImage, 4);
        first.binding_flags = DescriptorBindingFlags::VARIABLE_DESCRIPTOR_COUNT;

        let report = graph
            .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
                bindings: vec![first, binding(1, DescriptorType::Sampler, 1)],
                ..Default::default()
            })
            .unwrap_err();

        assert!(report
            .contains("VUID-VkDescriptorSetLayoutBindingFlagsCreateInfo-pBindingFlags-03004"));
    }

    #[test]
    fn mutable_type_list() {
        let capabilities = CapabilitySet::new().with_extension("ext_mutable_descriptor_type");
        let mut graph = ObjectGraph::new(capabilities).with_mode(ValidationMode::CollectAll);
        let mut mutable = binding(0, DescriptorType::Mutable, 1);
        mutable.mutable_descriptor_types = vec![
            DescriptorType::SampledImage,
            DescriptorType::UniformBufferDynamic,
            DescriptorType::SampledImage,
        ];

        let report = graph
            .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
                bindings: vec![mutable],
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            [
                "VUID-VkMutableDescriptorTypeListEXT-pDescriptorTypes-04599",
                "VUID-VkMutableDescriptorTypeListEXT-pDescriptorTypes-04602",
            ],
        );
    }
}
