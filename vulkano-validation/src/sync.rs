// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Pipeline stages, memory accesses and the flags of subpass dependencies.
//!
//! The values use the 64-bit `synchronization2` encoding, which is a superset of the original
//! 32-bit one. Stages and accesses that only exist in the 64-bit encoding need the
//! `synchronization2` feature.

use crate::{Requires, RequiresAllOf, RequiresOneOf};

vulkan_bitflags! {
    #[non_exhaustive]

    /// A set of pipeline stages.
    PipelineStages = PipelineStageFlags2(u64);

    /// A pseudo-stage representing the start of the pipeline.
    TOP_OF_PIPE = TOP_OF_PIPE,

    /// Indirect buffers are read.
    DRAW_INDIRECT = DRAW_INDIRECT,

    /// Vertex and index buffers are read.
    VERTEX_INPUT = VERTEX_INPUT,

    /// Vertex shaders are executed.
    VERTEX_SHADER = VERTEX_SHADER,

    /// Tessellation control shaders are executed.
    TESSELLATION_CONTROL_SHADER = TESSELLATION_CONTROL_SHADER,

    /// Tessellation evaluation shaders are executed.
    TESSELLATION_EVALUATION_SHADER = TESSELLATION_EVALUATION_SHADER,

    /// Geometry shaders are executed.
    GEOMETRY_SHADER = GEOMETRY_SHADER,

    /// Fragment shaders are executed.
    FRAGMENT_SHADER = FRAGMENT_SHADER,

    /// Early fragment tests (depth and stencil tests before fragment shading) are performed.
    /// Load operations of depth/stencil attachments happen here.
    EARLY_FRAGMENT_TESTS = EARLY_FRAGMENT_TESTS,

    /// Late fragment tests (depth and stencil tests after fragment shading) are performed.
    /// Store operations of depth/stencil attachments happen here.
    LATE_FRAGMENT_TESTS = LATE_FRAGMENT_TESTS,

    /// The final color values are output from the pipeline after blending. Load, store and
    /// resolve operations of color attachments happen here.
    COLOR_ATTACHMENT_OUTPUT = COLOR_ATTACHMENT_OUTPUT,

    /// Compute shaders are executed.
    COMPUTE_SHADER = COMPUTE_SHADER,

    /// All copy, blit, resolve and clear commands outside a render pass.
    ALL_TRANSFER = ALL_TRANSFER,

    /// A pseudo-stage representing the end of the pipeline.
    BOTTOM_OF_PIPE = BOTTOM_OF_PIPE,

    /// A pseudo-stage representing reads and writes to device memory on the host.
    HOST = HOST,

    /// Every graphics pipeline stage.
    ALL_GRAPHICS = ALL_GRAPHICS,

    /// Every stage of every command.
    ALL_COMMANDS = ALL_COMMANDS,

    /// Copy commands.
    COPY = COPY
    RequiresOneOf([
        RequiresAllOf([DeviceFeature(synchronization2)]),
    ]),

    /// Resolve commands outside a render pass.
    RESOLVE = RESOLVE
    RequiresOneOf([
        RequiresAllOf([DeviceFeature(synchronization2)]),
    ]),

    /// Blit commands.
    BLIT = BLIT
    RequiresOneOf([
        RequiresAllOf([DeviceFeature(synchronization2)]),
    ]),

    /// Clear commands outside a render pass.
    CLEAR = CLEAR
    RequiresOneOf([
        RequiresAllOf([DeviceFeature(synchronization2)]),
    ]),

    /// Index buffers are read.
    INDEX_INPUT = INDEX_INPUT
    RequiresOneOf([
        RequiresAllOf([DeviceFeature(synchronization2)]),
    ]),

    /// Vertex buffers are read.
    VERTEX_ATTRIBUTE_INPUT = VERTEX_ATTRIBUTE_INPUT
    RequiresOneOf([
        RequiresAllOf([DeviceFeature(synchronization2)]),
    ]),

    /// Every shader stage before rasterization.
    PRE_RASTERIZATION_SHADERS = PRE_RASTERIZATION_SHADERS
    RequiresOneOf([
        RequiresAllOf([DeviceFeature(synchronization2)]),
    ]),

    /// Vertex attribute output values are written to transform feedback buffers.
    TRANSFORM_FEEDBACK = TRANSFORM_FEEDBACK_EXT,

    /// The predicate of conditional rendering is read.
    CONDITIONAL_RENDERING = CONDITIONAL_RENDERING_EXT,

    /// The fragment density map is read to generate the fragment areas.
    FRAGMENT_DENSITY_PROCESS = FRAGMENT_DENSITY_PROCESS_EXT,

    /// Task shaders are executed.
    TASK_SHADER = TASK_SHADER_EXT,

    /// Mesh shaders are executed.
    MESH_SHADER = MESH_SHADER_EXT,
}

impl PipelineStages {
    /// The stages that operate on a single sample or pixel of the framebuffer. Dependencies
    /// between these stages can be limited to one region with `DependencyFlags::BY_REGION`.
    pub const FRAMEBUFFER_SPACE: Self = Self(
        Self::FRAGMENT_SHADER.0
            | Self::EARLY_FRAGMENT_TESTS.0
            | Self::LATE_FRAGMENT_TESTS.0
            | Self::COLOR_ATTACHMENT_OUTPUT.0,
    );

    const GRAPHICS_EXPANDED: Self = Self(
        Self::DRAW_INDIRECT.0
            | Self::TASK_SHADER.0
            | Self::MESH_SHADER.0
            | Self::VERTEX_INPUT.0
            | Self::INDEX_INPUT.0
            | Self::VERTEX_ATTRIBUTE_INPUT.0
            | Self::VERTEX_SHADER.0
            | Self::TESSELLATION_CONTROL_SHADER.0
            | Self::TESSELLATION_EVALUATION_SHADER.0
            | Self::GEOMETRY_SHADER.0
            | Self::PRE_RASTERIZATION_SHADERS.0
            | Self::FRAGMENT_SHADER.0
            | Self::EARLY_FRAGMENT_TESTS.0
            | Self::LATE_FRAGMENT_TESTS.0
            | Self::COLOR_ATTACHMENT_OUTPUT.0
            | Self::TRANSFORM_FEEDBACK.0
            | Self::CONDITIONAL_RENDERING.0
            | Self::FRAGMENT_DENSITY_PROCESS.0,
    );

    const TRANSFER_EXPANDED: Self =
        Self(Self::COPY.0 | Self::RESOLVE.0 | Self::BLIT.0 | Self::CLEAR.0);

    const SHADERS: Self = Self(
        Self::VERTEX_SHADER.0
            | Self::TESSELLATION_CONTROL_SHADER.0
            | Self::TESSELLATION_EVALUATION_SHADER.0
            | Self::GEOMETRY_SHADER.0
            | Self::FRAGMENT_SHADER.0
            | Self::COMPUTE_SHADER.0
            | Self::TASK_SHADER.0
            | Self::MESH_SHADER.0,
    );

    /// The stages that a dependency inside a graphics render pass may name for a subpass
    /// endpoint.
    pub const GRAPHICS_PIPELINE: Self = Self(
        Self::GRAPHICS_EXPANDED.0
            | Self::TOP_OF_PIPE.0
            | Self::BOTTOM_OF_PIPE.0
            | Self::ALL_GRAPHICS.0
            | Self::ALL_COMMANDS.0,
    );

    /// Replaces the stages that stand for a group of stages with the stages of the group, and
    /// adds them to the original.
    pub fn expand(mut self) -> Self {
        if self.intersects(Self::ALL_COMMANDS) {
            self |= Self::GRAPHICS_EXPANDED
                | Self::TRANSFER_EXPANDED
                | Self::COMPUTE_SHADER
                | Self::ALL_TRANSFER
                | Self::TOP_OF_PIPE
                | Self::BOTTOM_OF_PIPE;
        }

        if self.intersects(Self::ALL_GRAPHICS) {
            self |= Self::GRAPHICS_EXPANDED;
        }

        if self.intersects(Self::ALL_TRANSFER) {
            self |= Self::TRANSFER_EXPANDED;
        }

        if self.intersects(Self::VERTEX_INPUT) {
            self |= Self::INDEX_INPUT | Self::VERTEX_ATTRIBUTE_INPUT;
        }

        if self.intersects(Self::PRE_RASTERIZATION_SHADERS) {
            self |= Self::VERTEX_SHADER
                | Self::TESSELLATION_CONTROL_SHADER
                | Self::TESSELLATION_EVALUATION_SHADER
                | Self::GEOMETRY_SHADER
                | Self::TASK_SHADER
                | Self::MESH_SHADER;
        }

        self
    }

    /// Returns whether `self` is not empty and only contains framebuffer-space stages.
    #[inline]
    pub fn is_framebuffer_space(self) -> bool {
        let expanded = self.expand() - Self::ALL_GRAPHICS - Self::ALL_COMMANDS;
        !expanded.is_empty() && Self::FRAMEBUFFER_SPACE.contains(expanded)
    }

    /// Returns the access types that can be performed by the stages in `self`.
    ///
    /// Corresponds to the table of supported access types in the synchronization chapter of the
    /// Vulkan specification.
    pub fn supported_access(self) -> AccessFlags {
        let stages = self.expand();
        let mut result = AccessFlags::MEMORY_READ | AccessFlags::MEMORY_WRITE;

        if stages.intersects(Self::DRAW_INDIRECT) {
            result |= AccessFlags::INDIRECT_COMMAND_READ;
        }

        if stages.intersects(Self::INDEX_INPUT) {
            result |= AccessFlags::INDEX_READ;
        }

        if stages.intersects(Self::VERTEX_ATTRIBUTE_INPUT) {
            result |= AccessFlags::VERTEX_ATTRIBUTE_READ;
        }

        if stages.intersects(Self::SHADERS) {
            result |= AccessFlags::UNIFORM_READ
                | AccessFlags::SHADER_READ
                | AccessFlags::SHADER_WRITE
                | AccessFlags::SHADER_SAMPLED_READ
                | AccessFlags::SHADER_STORAGE_READ
                | AccessFlags::SHADER_STORAGE_WRITE;
        }

        if stages.intersects(Self::FRAGMENT_SHADER) {
            result |= AccessFlags::INPUT_ATTACHMENT_READ;
        }

        if stages.intersects(Self::COLOR_ATTACHMENT_OUTPUT) {
            result |= AccessFlags::COLOR_ATTACHMENT_READ | AccessFlags::COLOR_ATTACHMENT_WRITE;
        }

        if stages.intersects(Self::EARLY_FRAGMENT_TESTS | Self::LATE_FRAGMENT_TESTS) {
            result |= AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ
                | AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE;
        }

        if stages.intersects(Self::TRANSFER_EXPANDED) {
            result |= AccessFlags::TRANSFER_READ | AccessFlags::TRANSFER_WRITE;
        }

        if stages.intersects(Self::HOST) {
            result |= AccessFlags::HOST_READ | AccessFlags::HOST_WRITE;
        }

        result
    }

    /// Returns the positions in the logical order of the graphics pipeline of the earliest and
    /// the latest stage in `self`, or `None` if `self` contains no graphics stage.
    pub(crate) fn logical_order_bounds(self) -> Option<(u32, u32)> {
        let stages = self.expand();

        LOGICAL_ORDER
            .iter()
            .filter(|&&(stage, _)| stages.intersects(stage))
            .fold(None, |bounds, &(_, rank)| match bounds {
                None => Some((rank, rank)),
                Some((earliest, latest)) => Some((earliest.min(rank), latest.max(rank))),
            })
    }
}

/// The logical order of the graphics pipeline stages. The mesh shading stages are an alternative
/// to the stages from vertex input up to transform feedback, and share their positions.
const LOGICAL_ORDER: &[(PipelineStages, u32)] = &[
    (PipelineStages::TOP_OF_PIPE, 0),
    (PipelineStages::DRAW_INDIRECT, 1),
    (PipelineStages::CONDITIONAL_RENDERING, 1),
    (PipelineStages::TASK_SHADER, 2),
    (PipelineStages::MESH_SHADER, 3),
    (PipelineStages::VERTEX_INPUT, 2),
    (PipelineStages::INDEX_INPUT, 2),
    (PipelineStages::VERTEX_ATTRIBUTE_INPUT, 2),
    (PipelineStages::VERTEX_SHADER, 3),
    (PipelineStages::TESSELLATION_CONTROL_SHADER, 4),
    (PipelineStages::TESSELLATION_EVALUATION_SHADER, 5),
    (PipelineStages::GEOMETRY_SHADER, 6),
    (PipelineStages::TRANSFORM_FEEDBACK, 7),
    (PipelineStages::FRAGMENT_DENSITY_PROCESS, 8),
    (PipelineStages::EARLY_FRAGMENT_TESTS, 9),
    (PipelineStages::FRAGMENT_SHADER, 10),
    (PipelineStages::LATE_FRAGMENT_TESTS, 11),
    (PipelineStages::COLOR_ATTACHMENT_OUTPUT, 12),
    (PipelineStages::BOTTOM_OF_PIPE, 13),
];

/// A pipeline stage that needs a device feature, together with the rules that require it on
/// each side of a dependency.
pub(crate) struct GatedStage {
    pub(crate) stages: PipelineStages,
    pub(crate) requires_one_of: RequiresOneOf,
    /// VUIDs for the extended format, source then destination.
    pub(crate) vuids: [&'static [&'static str]; 2],
    /// VUIDs for the original format, source then destination.
    pub(crate) vuids_v1: [&'static [&'static str]; 2],
}

pub(crate) const GATED_STAGES: &[GatedStage] = &[
    GatedStage {
        stages: PipelineStages::GEOMETRY_SHADER,
        requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
            "geometry_shader",
        )])]),
        vuids: [
            &["VUID-VkMemoryBarrier2-srcStageMask-03929"],
            &["VUID-VkMemoryBarrier2-dstStageMask-03929"],
        ],
        vuids_v1: [
            &["VUID-VkSubpassDependency-srcStageMask-04090"],
            &["VUID-VkSubpassDependency-dstStageMask-04090"],
        ],
    },
    GatedStage {
        stages: PipelineStages(
            PipelineStages::TESSELLATION_CONTROL_SHADER.0
                | PipelineStages::TESSELLATION_EVALUATION_SHADER.0,
        ),
        requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
            "tessellation_shader",
        )])]),
        vuids: [
            &["VUID-VkMemoryBarrier2-srcStageMask-03930"],
            &["VUID-VkMemoryBarrier2-dstStageMask-03930"],
        ],
        vuids_v1: [
            &["VUID-VkSubpassDependency-srcStageMask-04091"],
            &["VUID-VkSubpassDependency-dstStageMask-04091"],
        ],
    },
    GatedStage {
        stages: PipelineStages::CONDITIONAL_RENDERING,
        requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
            "conditional_rendering",
        )])]),
        vuids: [
            &["VUID-VkMemoryBarrier2-srcStageMask-03931"],
            &["VUID-VkMemoryBarrier2-dstStageMask-03931"],
        ],
        vuids_v1: [
            &["VUID-VkSubpassDependency-srcStageMask-04092"],
            &["VUID-VkSubpassDependency-dstStageMask-04092"],
        ],
    },
    GatedStage {
        stages: PipelineStages::FRAGMENT_DENSITY_PROCESS,
        requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
            "fragment_density_map",
        )])]),
        vuids: [
            &["VUID-VkMemoryBarrier2-srcStageMask-03932"],
            &["VUID-VkMemoryBarrier2-dstStageMask-03932"],
        ],
        vuids_v1: [
            &["VUID-VkSubpassDependency-srcStageMask-04093"],
            &["VUID-VkSubpassDependency-dstStageMask-04093"],
        ],
    },
    GatedStage {
        stages: PipelineStages::TRANSFORM_FEEDBACK,
        requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
            "transform_feedback",
        )])]),
        vuids: [
            &["VUID-VkMemoryBarrier2-srcStageMask-03933"],
            &["VUID-VkMemoryBarrier2-dstStageMask-03933"],
        ],
        vuids_v1: [
            &["VUID-VkSubpassDependency-srcStageMask-04094"],
            &["VUID-VkSubpassDependency-dstStageMask-04094"],
        ],
    },
    GatedStage {
        stages: PipelineStages::MESH_SHADER,
        requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
            "mesh_shader",
        )])]),
        vuids: [
            &["VUID-VkMemoryBarrier2-srcStageMask-03934"],
            &["VUID-VkMemoryBarrier2-dstStageMask-03934"],
        ],
        vuids_v1: [
            &["VUID-VkSubpassDependency-srcStageMask-04095"],
            &["VUID-VkSubpassDependency-dstStageMask-04095"],
        ],
    },
    GatedStage {
        stages: PipelineStages::TASK_SHADER,
        requires_one_of: RequiresOneOf(&[RequiresAllOf(&[Requires::DeviceFeature(
            "task_shader",
        )])]),
        vuids: [
            &["VUID-VkMemoryBarrier2-srcStageMask-03935"],
            &["VUID-VkMemoryBarrier2-dstStageMask-03935"],
        ],
        vuids_v1: [
            &["VUID-VkSubpassDependency-srcStageMask-04096"],
            &["VUID-VkSubpassDependency-dstStageMask-04096"],
        ],
    },
];

vulkan_bitflags! {
    #[non_exhaustive]

    /// A set of memory access types that are included in a memory dependency.
    AccessFlags = AccessFlags2(u64);

    /// Read access to an indirect buffer.
    INDIRECT_COMMAND_READ = INDIRECT_COMMAND_READ,

    /// Read access to an index buffer.
    INDEX_READ = INDEX_READ,

    /// Read access to a vertex buffer.
    VERTEX_ATTRIBUTE_READ = VERTEX_ATTRIBUTE_READ,

    /// Read access to a uniform buffer in a shader.
    UNIFORM_READ = UNIFORM_READ,

    /// Read access to an input attachment in a fragment shader, within a render pass.
    INPUT_ATTACHMENT_READ = INPUT_ATTACHMENT_READ,

    /// Read access to a buffer or image in a shader.
    SHADER_READ = SHADER_READ,

    /// Write access to a buffer or image in a shader.
    SHADER_WRITE = SHADER_WRITE,

    /// Read access to a color attachment during blending, logic operations or subpass load
    /// operations.
    COLOR_ATTACHMENT_READ = COLOR_ATTACHMENT_READ,

    /// Write access to a color, resolve or depth/stencil resolve attachment during a render pass
    /// or subpass store operations.
    COLOR_ATTACHMENT_WRITE = COLOR_ATTACHMENT_WRITE,

    /// Read access to a depth/stencil attachment during depth/stencil operations or subpass load
    /// operations.
    DEPTH_STENCIL_ATTACHMENT_READ = DEPTH_STENCIL_ATTACHMENT_READ,

    /// Write access to a depth/stencil attachment during depth/stencil operations or subpass
    /// store operations.
    DEPTH_STENCIL_ATTACHMENT_WRITE = DEPTH_STENCIL_ATTACHMENT_WRITE,

    /// Read access to a buffer or image during a copy, blit or resolve command.
    TRANSFER_READ = TRANSFER_READ,

    /// Write access to a buffer or image during a copy, blit, resolve or clear command.
    TRANSFER_WRITE = TRANSFER_WRITE,

    /// Read access performed by the host.
    HOST_READ = HOST_READ,

    /// Write access performed by the host.
    HOST_WRITE = HOST_WRITE,

    /// Any type of read access.
    MEMORY_READ = MEMORY_READ,

    /// Any type of write access.
    MEMORY_WRITE = MEMORY_WRITE,

    /// Read access to a uniform texel buffer or sampled image in a shader.
    SHADER_SAMPLED_READ = SHADER_SAMPLED_READ
    RequiresOneOf([
        RequiresAllOf([DeviceFeature(synchronization2)]),
    ]),

    /// Read access to a storage buffer, storage texel buffer or storage image in a shader.
    SHADER_STORAGE_READ = SHADER_STORAGE_READ
    RequiresOneOf([
        RequiresAllOf([DeviceFeature(synchronization2)]),
    ]),

    /// Write access to a storage buffer, storage texel buffer or storage image in a shader.
    SHADER_STORAGE_WRITE = SHADER_STORAGE_WRITE
    RequiresOneOf([
        RequiresAllOf([DeviceFeature(synchronization2)]),
    ]),
}

impl AccessFlags {
    /// Returns whether `self` contains a write access.
    #[inline]
    pub fn contains_writes(self) -> bool {
        self.intersects(
            Self::SHADER_WRITE
                | Self::COLOR_ATTACHMENT_WRITE
                | Self::DEPTH_STENCIL_ATTACHMENT_WRITE
                | Self::TRANSFER_WRITE
                | Self::HOST_WRITE
                | Self::MEMORY_WRITE
                | Self::SHADER_STORAGE_WRITE,
        )
    }
}

vulkan_bitflags! {
    #[non_exhaustive]

    /// Flags that modify the behavior of a dependency.
    DependencyFlags = DependencyFlags(u32);

    /// For framebuffer-space stages, the dependency only applies to the same region of the
    /// framebuffer, rather than to the whole framebuffer.
    BY_REGION = BY_REGION,

    /// For devices that consist of multiple physical devices, the dependency is non-local.
    DEVICE_GROUP = DEVICE_GROUP
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_1)]),
        RequiresAllOf([DeviceExtension(khr_device_group)]),
    ]),

    /// For subpasses that use multiview, the dependency is between pairs of views with the same
    /// index, offset by the view offset of the dependency.
    VIEW_LOCAL = VIEW_LOCAL
    RequiresOneOf([
        RequiresAllOf([APIVersion(V1_1)]),
        RequiresAllOf([DeviceExtension(khr_multiview)]),
    ]),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_meta_stages() {
        let stages = PipelineStages::ALL_GRAPHICS.expand();
        assert!(stages.contains(PipelineStages::FRAMEBUFFER_SPACE));
        assert!(!stages.intersects(PipelineStages::COMPUTE_SHADER));

        let stages = PipelineStages::PRE_RASTERIZATION_SHADERS.expand();
        assert!(stages.contains(PipelineStages::GEOMETRY_SHADER));
        assert!(!stages.intersects(PipelineStages::FRAGMENT_SHADER));
    }

    #[test]
    fn framebuffer_space() {
        assert!((PipelineStages::LATE_FRAGMENT_TESTS | PipelineStages::FRAGMENT_SHADER)
            .is_framebuffer_space());
        assert!(
            !(PipelineStages::FRAGMENT_SHADER | PipelineStages::VERTEX_SHADER)
                .is_framebuffer_space()
        );
        assert!(!PipelineStages::empty().is_framebuffer_space());
        assert!(!PipelineStages::ALL_GRAPHICS.is_framebuffer_space());
    }

    #[test]
    fn supported_access() {
        let access = PipelineStages::COLOR_ATTACHMENT_OUTPUT.supported_access();
        assert!(access.contains(AccessFlags::COLOR_ATTACHMENT_WRITE));
        assert!(!access.intersects(AccessFlags::INPUT_ATTACHMENT_READ));

        let access = PipelineStages::ALL_GRAPHICS.supported_access();
        assert!(access.contains(
            AccessFlags::INPUT_ATTACHMENT_READ | AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE
        ));
        assert!(!access.intersects(AccessFlags::HOST_READ));
    }

    #[test]
    fn logical_order() {
        assert_eq!(
            (PipelineStages::LATE_FRAGMENT_TESTS | PipelineStages::VERTEX_SHADER)
                .logical_order_bounds(),
            Some((3, 11)),
        );
        assert_eq!(PipelineStages::HOST.logical_order_bounds(), None);
        assert_eq!(
            PipelineStages::ALL_COMMANDS.logical_order_bounds(),
            Some((0, 13)),
        );
    }
}
