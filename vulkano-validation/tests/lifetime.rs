// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use vulkano_validation::{
    buffer::{Buffer, BufferCreateInfo, BufferUsage, WHOLE_SIZE},
    descriptor_set::{
        DescriptorBindingFlags, DescriptorBufferInfo, DescriptorData, DescriptorPoolCreateFlags,
        DescriptorPoolCreateInfo, DescriptorSet, DescriptorSetAllocateInfo,
        DescriptorSetLayoutBinding, DescriptorSetLayoutCreateFlags, DescriptorSetLayoutCreateInfo,
        DescriptorType, WriteDescriptorSet,
    },
    lifetime::{ResourceState, SequenceState},
    CapabilitySet, ErrorKind, Id, ObjectGraph, Version,
};

fn uniform_buffer(graph: &mut ObjectGraph) -> Id<Buffer> {
    graph
        .create_buffer(BufferCreateInfo {
            size: 256,
            usage: BufferUsage::UNIFORM_BUFFER,
            ..Default::default()
        })
        .unwrap()
}

fn write(set: Id<DescriptorSet>, binding: u32, buffer: Id<Buffer>) -> WriteDescriptorSet {
    WriteDescriptorSet::new(
        set,
        binding,
        DescriptorType::UniformBuffer,
        DescriptorData::Buffer(vec![DescriptorBufferInfo::new(buffer, 0, WHOLE_SIZE)]),
    )
}

fn simple_set(graph: &mut ObjectGraph, pool_flags: DescriptorPoolCreateFlags) -> Id<DescriptorSet> {
    let layout = graph
        .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
            bindings: vec![DescriptorSetLayoutBinding::new(
                0,
                DescriptorType::UniformBuffer,
            )],
            ..Default::default()
        })
        .unwrap();
    let pool = graph
        .create_descriptor_pool(DescriptorPoolCreateInfo {
            flags: pool_flags,
            max_sets: 2,
            pool_sizes: [(DescriptorType::UniformBuffer, 2)].into_iter().collect(),
            ..Default::default()
        })
        .unwrap();

    graph
        .allocate_descriptor_sets(DescriptorSetAllocateInfo::new(pool, [layout]))
        .unwrap()[0]
}

#[test]
fn pool_reset_invalidates_sequences() {
    let mut graph = ObjectGraph::new(CapabilitySet::new());
    let set = simple_set(&mut graph, DescriptorPoolCreateFlags::empty());
    let pool = graph.get(set).unwrap().pool();

    let sequence = graph.begin_sequence();
    graph.bind_descriptor_set(sequence, set).unwrap();
    graph.end_sequence(sequence).unwrap();
    assert_eq!(graph.resource_state(set.erase()), ResourceState::ReferencedByRecording);

    graph.reset_descriptor_pool(pool).unwrap();

    assert_eq!(graph.resource_state(set.erase()), ResourceState::Destroyed);
    assert!(graph.get(set).is_err());
    assert_eq!(graph.sequence_state(sequence).unwrap(), SequenceState::Invalidated);

    let report = graph.submit(sequence).unwrap_err();
    assert_eq!(
        report.rule_ids().collect::<Vec<_>>(),
        ["VUID-vkQueueSubmit-pCommandBuffers-00070"],
    );
    assert_eq!(report.first().unwrap().kind(), ErrorKind::DanglingReference);
}

#[test]
fn pool_reset_while_pending() {
    let mut graph = ObjectGraph::new(CapabilitySet::new());
    let set = simple_set(&mut graph, DescriptorPoolCreateFlags::empty());
    let pool = graph.get(set).unwrap().pool();

    let sequence = graph.begin_sequence();
    graph.bind_descriptor_set(sequence, set).unwrap();
    graph.end_sequence(sequence).unwrap();
    graph.submit(sequence).unwrap();

    let report = graph.reset_descriptor_pool(pool).unwrap_err();
    assert!(report.contains("VUID-vkResetDescriptorPool-descriptorPool-00313"));
    assert_eq!(report.first().unwrap().kind(), ErrorKind::ResourceInUse);

    // Nothing changed.
    assert!(graph.get(set).is_ok());

    graph.retire(sequence).unwrap();
    graph.reset_descriptor_pool(pool).unwrap();
    assert_eq!(graph.sequence_state(sequence).unwrap(), SequenceState::Retired);
}

#[test]
fn destroyed_descriptor_contents() {
    let mut graph = ObjectGraph::new(CapabilitySet::new());
    let set = simple_set(&mut graph, DescriptorPoolCreateFlags::empty());
    let buffer = uniform_buffer(&mut graph);
    graph.update_descriptor_sets(&[write(set, 0, buffer)], &[]).unwrap();

    let sequence = graph.begin_sequence();
    graph.bind_descriptor_set(sequence, set).unwrap();
    graph.end_sequence(sequence).unwrap();
    graph.submit(sequence).unwrap();
    assert_eq!(graph.resource_state(buffer.erase()), ResourceState::ReferencedByInFlight);

    let report = graph.destroy(buffer).unwrap_err();
    assert_eq!(
        report.rule_ids().collect::<Vec<_>>(),
        ["VUID-vkDestroyBuffer-buffer-00922"],
    );
    assert_eq!(report.first().unwrap().kind(), ErrorKind::ResourceInUse);

    graph.retire(sequence).unwrap();
    assert_eq!(graph.resource_state(buffer.erase()), ResourceState::Live);
    graph.destroy(buffer).unwrap();

    // The set still holds the destroyed buffer, so binding it refers to a dangling object.
    let sequence = graph.begin_sequence();
    let report = graph.bind_descriptor_set(sequence, set).unwrap_err();
    assert_eq!(
        report.rule_ids().collect::<Vec<_>>(),
        ["UNASSIGNED-Lifetime-dangling-reference"],
    );
    assert_eq!(report.first().unwrap().kind(), ErrorKind::DanglingReference);

    // Destroying it twice is reported the same way.
    let report = graph.destroy(buffer).unwrap_err();
    assert_eq!(report.first().unwrap().kind(), ErrorKind::DanglingReference);
}

#[test]
fn update_after_bind_reaches_bound_sequences() {
    let capabilities = CapabilitySet::new()
        .with_api_version(Version::V1_2)
        .with_feature("descriptor_binding_uniform_buffer_update_after_bind");
    let mut graph = ObjectGraph::new(capabilities);

    let layout = graph
        .create_descriptor_set_layout(DescriptorSetLayoutCreateInfo {
            flags: DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL,
            bindings: vec![
                DescriptorSetLayoutBinding {
                    binding_flags: DescriptorBindingFlags::UPDATE_AFTER_BIND,
                    ..DescriptorSetLayoutBinding::new(0, DescriptorType::UniformBuffer)
                },
                DescriptorSetLayoutBinding::new(1, DescriptorType::UniformBuffer),
            ],
            ..Default::default()
        })
        .unwrap();
    let pool = graph
        .create_descriptor_pool(DescriptorPoolCreateInfo {
            flags: DescriptorPoolCreateFlags::UPDATE_AFTER_BIND,
            max_sets: 1,
            pool_sizes: [(DescriptorType::UniformBuffer, 2)].into_iter().collect(),
            ..Default::default()
        })
        .unwrap();
    let set = graph
        .allocate_descriptor_sets(DescriptorSetAllocateInfo::new(pool, [layout]))
        .unwrap()[0];
    let buffer = uniform_buffer(&mut graph);

    let sequence = graph.begin_sequence();
    graph.bind_descriptor_set(sequence, set).unwrap();
    assert_eq!(graph.resource_state(buffer.erase()), ResourceState::Live);

    graph.update_descriptor_sets(&[write(set, 0, buffer)], &[]).unwrap();
    assert_eq!(graph.resource_state(buffer.erase()), ResourceState::ReferencedByRecording);

    let report = graph
        .update_descriptor_sets(&[write(set, 1, buffer)], &[])
        .unwrap_err();
    assert!(report.contains("VUID-vkUpdateDescriptorSets-None-03047"));

    graph.end_sequence(sequence).unwrap();
    graph.submit(sequence).unwrap();
    assert!(graph.destroy(buffer).is_err());
}
