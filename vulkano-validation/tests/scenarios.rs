// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use vulkano_validation::{
    buffer::{BufferCreateInfo, BufferUsage, WHOLE_SIZE},
    descriptor_set::{
        DescriptorBufferInfo, DescriptorData, DescriptorPoolCreateInfo, DescriptorSetAllocateInfo,
        DescriptorSetLayoutBinding, DescriptorSetLayoutCreateInfo, DescriptorType,
        WriteDescriptorSet,
    },
    format::Format,
    image::ImageLayout,
    render_pass::{
        legacy::{RenderPassDescriptorV1, SubpassDependencyDescriptorV1, SubpassDescriptorV1},
        AttachmentDescription, AttachmentReference, AttachmentRules, LoadOp, RenderPassCreateInfo,
        StoreOp, SubpassDependency, SubpassDescription,
    },
    sync::PipelineStages,
    CapabilitySet, ErrorKind, ObjectGraph, ValidationMode,
};

fn collect_all() -> ObjectGraph {
    ObjectGraph::new(CapabilitySet::new()).with_mode(ValidationMode::CollectAll)
}

#[test]
fn dependency_subpasses_out_of_range() {
    let mut graph = collect_all();

    let report = graph
        .create_render_pass(RenderPassCreateInfo {
            subpasses: vec![SubpassDescription::default(), SubpassDescription::default()],
            dependencies: vec![SubpassDependency {
                src_subpass: Some(4),
                dst_subpass: Some(4),
                src_stages: PipelineStages::COLOR_ATTACHMENT_OUTPUT,
                dst_stages: PipelineStages::FRAGMENT_SHADER,
                ..Default::default()
            }],
            ..Default::default()
        })
        .unwrap_err();

    assert_eq!(
        report.rule_ids().collect::<Vec<_>>(),
        [
            "VUID-VkRenderPassCreateInfo2-srcSubpass-02526",
            "VUID-VkRenderPassCreateInfo2-dstSubpass-02527",
        ],
    );
    assert!(report.kinds().all(|kind| kind == ErrorKind::Consistency));
    assert!(report.errors()[0].context.starts_with("create_info."));

    // The same render pass in the original format reports the VUIDs of that format.
    let report = graph
        .create_render_pass_v1(&RenderPassDescriptorV1 {
            subpasses: vec![SubpassDescriptorV1::default(), SubpassDescriptorV1::default()],
            dependencies: vec![SubpassDependencyDescriptorV1 {
                src_subpass: 4,
                dst_subpass: 4,
                src_stages: PipelineStages::COLOR_ATTACHMENT_OUTPUT,
                dst_stages: PipelineStages::FRAGMENT_SHADER,
                ..Default::default()
            }],
            ..Default::default()
        })
        .unwrap_err();

    assert_eq!(
        report.rule_ids().collect::<Vec<_>>(),
        [
            "VUID-VkRenderPassCreateInfo-srcSubpass-02517",
            "VUID-VkRenderPassCreateInfo-dstSubpass-02518",
        ],
    );
}

#[test]
fn write_past_the_end_of_a_binding() {
    let mut graph = collect_all();

    let layout = graph
        .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
            bindings: vec![DescriptorSetLayoutBinding {
                descriptor_count: 3,
                ..DescriptorSetLayoutBinding::new(0, DescriptorType::UniformBuffer)
            }],
            ..Default::default()
        })
        .unwrap();
    let pool = graph
        .create_descriptor_pool(DescriptorPoolCreateInfo {
            max_sets: 1,
            pool_sizes: [(DescriptorType::UniformBuffer, 3)].into_iter().collect(),
            ..Default::default()
        })
        .unwrap();
    let set = graph
        .allocate_descriptor_sets(DescriptorSetAllocateInfo::new(pool, [layout]))
        .unwrap()[0];
    let buffer = graph
        .create_buffer(BufferCreateInfo {
            size: 256,
            usage: BufferUsage::UNIFORM_BUFFER,
            ..Default::default()
        })
        .unwrap();

    let report = graph
        .update_descriptor_sets(
            &[WriteDescriptorSet {
                dst_array_element: 2,
                ..WriteDescriptorSet::new(
                    set,
                    0,
                    DescriptorType::UniformBuffer,
                    DescriptorData::Buffer(vec![
                        DescriptorBufferInfo::new(buffer, 0, WHOLE_SIZE);
                        5
                    ]),
                )
            }],
            &[],
        )
        .unwrap_err();

    assert_eq!(
        report.rule_ids().collect::<Vec<_>>(),
        ["VUID-VkWriteDescriptorSet-dstArrayElement-00321"],
    );
    assert!(graph.get(set).unwrap().referenced_objects().is_empty());
}

#[test]
fn undefined_final_layout() {
    let description = AttachmentDescription {
        format: Format::R8G8B8A8_UNORM,
        load_op: LoadOp::Clear,
        store_op: StoreOp::Store,
        final_layout: ImageLayout::Undefined,
        ..Default::default()
    };

    let capabilities = CapabilitySet::new();
    let report = AttachmentRules::new(&capabilities)
        .validate_description(&description)
        .unwrap_err();
    assert_eq!(
        report.rule_ids().collect::<Vec<_>>(),
        ["VUID-VkAttachmentDescription2-finalLayout-03061"],
    );

    // A legal reference does not hide or duplicate the error of the description.
    let mut graph = collect_all();
    let report = graph
        .create_render_pass(RenderPassCreateInfo {
            attachments: vec![description],
            subpasses: vec![SubpassDescription {
                color_attachments: vec![Some(AttachmentReference {
                    attachment: 0,
                    layout: ImageLayout::General,
                    ..Default::default()
                })],
                ..Default::default()
            }],
            ..Default::default()
        })
        .unwrap_err();

    assert_eq!(
        report.count("VUID-VkAttachmentDescription2-finalLayout-03061"),
        1,
    );
    assert_eq!(
        report.first().unwrap().rule_id(),
        Some("VUID-VkAttachmentDescription2-finalLayout-03061"),
    );
    assert_eq!(report.first().unwrap().context, "create_info.attachments[0].final_layout");
}

#[test]
fn self_dependency_out_of_order() {
    let create_info = RenderPassCreateInfo {
        subpasses: vec![SubpassDescription::default()],
        dependencies: vec![SubpassDependency {
            src_subpass: Some(0),
            dst_subpass: Some(0),
            src_stages: PipelineStages::LATE_FRAGMENT_TESTS,
            dst_stages: PipelineStages::EARLY_FRAGMENT_TESTS,
            ..Default::default()
        }],
        ..Default::default()
    };

    let mut graph = ObjectGraph::new(CapabilitySet::new());
    let report = graph.create_render_pass(create_info.clone()).unwrap_err();
    assert_eq!(
        report.rule_ids().collect::<Vec<_>>(),
        ["VUID-VkSubpassDependency2-srcSubpass-03087"],
    );

    let mut graph = collect_all();
    let report = graph.create_render_pass(create_info).unwrap_err();
    assert_eq!(
        report.first().unwrap().rule_id(),
        Some("VUID-VkSubpassDependency2-srcSubpass-03087"),
    );
    assert!(!report.rule_ids().any(|rule_id| rule_id.contains("StageMask")));
}
