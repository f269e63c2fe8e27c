// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Tracking of the objects that recorded command sequences refer to.
//!
//! A command sequence stands for a command buffer: it is begun, commands referring to objects
//! are recorded into it, it is ended, submitted, and eventually retired once the device has
//! finished executing it. While a sequence holds a reference, the referenced object must not be
//! destroyed. Once an object is destroyed, no sequence may reference it again.
//!
//! The tracker only observes. Objects are owned by whoever created them, and the tracker never
//! keeps one alive.

use crate::{
    graph::{Id, InvalidSlotError, ObjectId, ObjectType},
    report::Halt,
    slotmap::SlotMap,
    ErrorKind, ValidationError, ValidationMode, ValidationReport,
};
use foldhash::{HashMap, HashSet};

/// Rule ID of a reference to an object that has been destroyed.
pub const DANGLING_REFERENCE: &str = "UNASSIGNED-Lifetime-dangling-reference";

/// Rule ID of recording into a command sequence that is not in the recording state.
pub const NOT_RECORDING: &str = "UNASSIGNED-CommandSequence-not-recording";

/// Rule ID of retiring a command sequence that was not submitted.
pub const NOT_PENDING: &str = "UNASSIGNED-CommandSequence-not-pending";

/// The state of an object as seen by the command sequences that refer to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// No sequence that is recording, executable or pending refers to the object.
    Live,

    /// A sequence that is recording or executable refers to the object, but no pending one does.
    ReferencedByRecording,

    /// A pending sequence refers to the object.
    ReferencedByInFlight,

    /// The object has been destroyed.
    Destroyed,
}

/// The state of a command sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SequenceState {
    /// Commands can be recorded.
    Recording,

    /// Recording has ended, and the sequence can be submitted.
    Executable,

    /// The sequence has been submitted, and the device may still be executing it.
    Pending,

    /// The device has finished executing the sequence. It must be reset before it is used again.
    Retired,

    /// An object the sequence referred to was destroyed before the sequence was submitted. It
    /// must be reset before it is used again.
    Invalidated,
}

impl SequenceState {
    /// Returns whether the references of a sequence in this state keep objects in use.
    #[inline]
    fn holds_references(self) -> bool {
        matches!(
            self,
            SequenceState::Recording | SequenceState::Executable | SequenceState::Pending
        )
    }
}

/// A command sequence as recorded in the tracker.
#[derive(Debug)]
pub struct CommandSequence {
    state: SequenceState,
    references: Vec<ObjectId>,
}

impl CommandSequence {
    /// Returns the state of the sequence.
    #[inline]
    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Returns the objects that the sequence refers to, in the order they were first recorded.
    #[inline]
    pub fn references(&self) -> &[ObjectId] {
        &self.references
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Usage {
    recording: u32,
    pending: u32,
}

/// Tracks the state of command sequences and the objects they refer to.
#[derive(Debug, Default)]
pub struct LifetimeTracker {
    mode: ValidationMode,
    sequences: SlotMap<CommandSequence>,
    usage: HashMap<ObjectId, Usage>,
    destroyed: HashSet<ObjectId>,
}

impl LifetimeTracker {
    /// Returns an empty tracker that reports in fail-fast mode.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the validation mode of the reports.
    #[inline]
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the validation mode of the reports.
    #[inline]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: ValidationMode) {
        self.mode = mode;
    }

    /// Begins a new command sequence in the recording state.
    pub fn begin_sequence(&mut self) -> Id<CommandSequence> {
        let slot = self.sequences.insert_with_tag(
            CommandSequence {
                state: SequenceState::Recording,
                references: Vec::new(),
            },
            ObjectType::CommandSequence as u32,
        );
        let id = Id::new(slot);
        log::trace!("began {:?}", id);

        id
    }

    /// Returns the sequence with the given ID.
    #[inline]
    pub fn sequence(&self, id: Id<CommandSequence>) -> Result<&CommandSequence, InvalidSlotError> {
        self.sequences
            .get(id.slot())
            .ok_or_else(|| InvalidSlotError::new(id))
    }

    /// Returns the state of the sequence with the given ID.
    #[inline]
    pub fn sequence_state(
        &self,
        id: Id<CommandSequence>,
    ) -> Result<SequenceState, InvalidSlotError> {
        self.sequence(id).map(CommandSequence::state)
    }

    /// Returns the state of `object`.
    pub fn resource_state(&self, object: ObjectId) -> ResourceState {
        if self.destroyed.contains(&object) {
            return ResourceState::Destroyed;
        }

        match self.usage.get(&object) {
            Some(usage) if usage.pending != 0 => ResourceState::ReferencedByInFlight,
            Some(usage) if usage.recording != 0 => ResourceState::ReferencedByRecording,
            _ => ResourceState::Live,
        }
    }

    /// Returns whether `object` has been destroyed.
    #[inline]
    pub fn is_destroyed(&self, object: ObjectId) -> bool {
        self.destroyed.contains(&object)
    }

    /// Records that `sequence` refers to `object`.
    pub fn record_reference(
        &mut self,
        sequence: Id<CommandSequence>,
        object: ObjectId,
    ) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            if self.check_record_reference(sequence, &[object], report)? {
                self.add_references(sequence, &[object]);
            }

            Ok(())
        })
    }

    /// Ends the recording of `sequence`.
    pub fn end_sequence(&mut self, sequence: Id<CommandSequence>) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| self.check_end(sequence, report))?;
        self.set_state(sequence, SequenceState::Executable);

        Ok(())
    }

    /// Submits `sequence`, moving every object it refers to in flight.
    pub fn submit(&mut self, sequence: Id<CommandSequence>) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| self.check_submit(sequence, report))?;
        self.set_state(sequence, SequenceState::Pending);

        Ok(())
    }

    /// Marks `sequence` as having finished execution. Objects that no other pending sequence
    /// refers to are no longer in flight.
    pub fn retire(&mut self, sequence: Id<CommandSequence>) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| self.check_retire(sequence, report))?;
        self.set_state(sequence, SequenceState::Retired);

        Ok(())
    }

    /// Resets `sequence` to the recording state with no references.
    pub fn reset_sequence(
        &mut self,
        sequence: Id<CommandSequence>,
    ) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            self.check_not_pending(
                sequence,
                &["VUID-vkResetCommandBuffer-commandBuffer-00045"],
                report,
            )
        })?;

        self.set_state(sequence, SequenceState::Invalidated);

        if let Some(sequence) = self.sequences.get_mut(sequence.slot()) {
            sequence.references.clear();
            sequence.state = SequenceState::Recording;
        }

        Ok(())
    }

    /// Frees `sequence`, releasing its references.
    pub fn free_sequence(&mut self, sequence: Id<CommandSequence>) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| {
            self.check_not_pending(
                sequence,
                &["VUID-vkFreeCommandBuffers-pCommandBuffers-00047"],
                report,
            )
        })?;

        self.set_state(sequence, SequenceState::Invalidated);
        self.sequences.remove(sequence.slot());
        log::trace!("freed {:?}", sequence);

        Ok(())
    }

    /// Destroys `object`. Fails if a recording, executable or pending sequence refers to it.
    pub fn destroy(&mut self, object: ObjectId) -> Result<(), ValidationReport> {
        ValidationReport::run(self.mode, |report| self.check_destroy(object, "", report))?;
        self.mark_destroyed(object);

        Ok(())
    }

    /// Returns whether the references can be recorded. An object that is already destroyed is
    /// a dangling reference.
    pub(crate) fn check_record_reference(
        &self,
        sequence: Id<CommandSequence>,
        objects: &[ObjectId],
        report: &mut ValidationReport,
    ) -> Result<bool, Halt> {
        let mark = report.mark();
        let state = self.check_sequence(sequence, report)?;

        if let Some(state) = state.filter(|&state| state != SequenceState::Recording) {
            report.push(Box::new(ValidationError {
                context: "sequence".into(),
                problem: format!("is in the `{:?}` state, not the recording state", state).into(),
                vuids: &[NOT_RECORDING],
                ..Default::default()
            }))?;
        }

        for &object in objects {
            if self.is_destroyed(object) {
                report.push(dangling_reference(object))?;
            }
        }

        Ok(!report.failed_since(mark))
    }

    pub(crate) fn check_end(
        &self,
        sequence: Id<CommandSequence>,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        if let Some(state) = self.check_sequence(sequence, report)? {
            if state != SequenceState::Recording {
                report.push(Box::new(ValidationError {
                    context: "sequence".into(),
                    problem: format!("is in the `{:?}` state, not the recording state", state)
                        .into(),
                    vuids: &["VUID-vkEndCommandBuffer-commandBuffer-00059"],
                    ..Default::default()
                }))?;
            }
        }

        Ok(())
    }

    pub(crate) fn check_submit(
        &self,
        sequence: Id<CommandSequence>,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let Some(state) = self.check_sequence(sequence, report)? else {
            return Ok(());
        };

        match state {
            SequenceState::Executable => (),
            SequenceState::Pending => {
                report.push(Box::new(ValidationError {
                    context: "sequence".into(),
                    problem: "is already pending".into(),
                    vuids: &["VUID-vkQueueSubmit-pCommandBuffers-00071"],
                    ..Default::default()
                }))?;
            }
            SequenceState::Invalidated => {
                report.push(Box::new(ValidationError {
                    context: "sequence".into(),
                    problem: "was invalidated, because an object it refers to was destroyed"
                        .into(),
                    vuids: &["VUID-vkQueueSubmit-pCommandBuffers-00070"],
                    kind: ErrorKind::DanglingReference,
                    ..Default::default()
                }))?;
            }
            SequenceState::Recording | SequenceState::Retired => {
                report.push(Box::new(ValidationError {
                    context: "sequence".into(),
                    problem: format!(
                        "is in the `{:?}` state, not the executable state",
                        state,
                    )
                    .into(),
                    vuids: &["VUID-vkQueueSubmit-pCommandBuffers-00070"],
                    ..Default::default()
                }))?;
            }
        }

        if let Ok(sequence) = self.sequence(sequence) {
            for &object in &sequence.references {
                if self.is_destroyed(object) {
                    report.push(dangling_reference(object))?;
                }
            }
        }

        Ok(())
    }

    pub(crate) fn check_retire(
        &self,
        sequence: Id<CommandSequence>,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        if let Some(state) = self.check_sequence(sequence, report)? {
            if state != SequenceState::Pending {
                report.push(Box::new(ValidationError {
                    context: "sequence".into(),
                    problem: format!("is in the `{:?}` state, not the pending state", state)
                        .into(),
                    vuids: &[NOT_PENDING],
                    ..Default::default()
                }))?;
            }
        }

        Ok(())
    }

    pub(crate) fn check_not_pending(
        &self,
        sequence: Id<CommandSequence>,
        vuids: &'static [&'static str],
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        if self.check_sequence(sequence, report)? == Some(SequenceState::Pending) {
            report.push(Box::new(ValidationError {
                context: "sequence".into(),
                problem: "is pending".into(),
                vuids,
                kind: ErrorKind::ResourceInUse,
                ..Default::default()
            }))?;
        }

        Ok(())
    }

    /// Checks that `object` can be destroyed.
    pub(crate) fn check_destroy(
        &self,
        object: ObjectId,
        context: &'static str,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let state = match self.resource_state(object) {
            ResourceState::Live => return Ok(()),
            ResourceState::Destroyed => return report.push(dangling_reference(object)),
            ResourceState::ReferencedByRecording => "a recording or executable",
            ResourceState::ReferencedByInFlight => "a pending",
        };

        report.push(Box::new(ValidationError {
            context: context.into(),
            problem: format!(
                "is referred to by {} command sequence ({:?})",
                state, object,
            )
            .into(),
            vuids: destroy_in_use_vuids(object.object_type()),
            kind: ErrorKind::ResourceInUse,
            ..Default::default()
        }))
    }

    /// Returns the state of `sequence`, or reports it as an invalid handle.
    fn check_sequence(
        &self,
        sequence: Id<CommandSequence>,
        report: &mut ValidationReport,
    ) -> Result<Option<SequenceState>, Halt> {
        match self.sequence_state(sequence) {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                report.push(Box::new(ValidationError {
                    context: "sequence".into(),
                    problem: err.to_string().into(),
                    vuids: &[crate::graph::INVALID_HANDLE],
                    kind: ErrorKind::Structural,
                    ..Default::default()
                }))?;

                Ok(None)
            }
        }
    }

    /// Adds references that passed `check_record_reference`.
    pub(crate) fn add_references(&mut self, sequence: Id<CommandSequence>, objects: &[ObjectId]) {
        let Some(sequence) = self.sequences.get_mut(sequence.slot()) else {
            return;
        };

        for &object in objects {
            if sequence.references.contains(&object) {
                continue;
            }

            sequence.references.push(object);
            let usage = self.usage.entry(object).or_default();

            if sequence.state == SequenceState::Pending {
                usage.pending += 1;
            } else {
                usage.recording += 1;
            }
        }
    }

    /// Adds `objects` to every sequence that holds a reference to `user`.
    pub(crate) fn add_references_to_users(&mut self, user: ObjectId, objects: &[ObjectId]) {
        let users: Vec<_> = (self.sequences.iter())
            .filter(|(_, sequence)| {
                sequence.state.holds_references() && sequence.references.contains(&user)
            })
            .map(|(slot, _)| Id::new(slot))
            .collect();

        for sequence in users {
            self.add_references(sequence, objects);
        }
    }

    /// Destroys `object` regardless of the sequences that refer to it. Sequences that are
    /// recording or executable are invalidated. No pending sequence may refer to the object.
    pub(crate) fn force_destroy(&mut self, object: ObjectId) {
        let users: Vec<_> = (self.sequences.iter())
            .filter(|(_, sequence)| {
                matches!(
                    sequence.state,
                    SequenceState::Recording | SequenceState::Executable
                ) && sequence.references.contains(&object)
            })
            .map(|(slot, _)| Id::<CommandSequence>::new(slot))
            .collect();

        for sequence in users {
            log::debug!("{:?} invalidated by the destruction of {:?}", sequence, object);
            self.set_state(sequence, SequenceState::Invalidated);
        }

        self.mark_destroyed(object);
    }

    pub(crate) fn mark_destroyed(&mut self, object: ObjectId) {
        debug_assert!(matches!(
            self.resource_state(object),
            ResourceState::Live | ResourceState::Destroyed,
        ));

        self.usage.remove(&object);
        self.destroyed.insert(object);
    }

    /// Moves `sequence` to `state`, and updates the usage of the objects it refers to.
    fn set_state(&mut self, sequence: Id<CommandSequence>, state: SequenceState) {
        let Some(sequence_ref) = self.sequences.get_mut(sequence.slot()) else {
            return;
        };

        let old_state = sequence_ref.state;
        sequence_ref.state = state;

        let was_pending = old_state == SequenceState::Pending;
        let is_pending = state == SequenceState::Pending;

        for object in &sequence_ref.references {
            let Some(usage) = self.usage.get_mut(object) else {
                continue;
            };

            if old_state.holds_references() {
                if was_pending {
                    usage.pending -= 1;
                } else {
                    usage.recording -= 1;
                }
            }

            if state.holds_references() {
                if is_pending {
                    usage.pending += 1;
                } else {
                    usage.recording += 1;
                }
            }
        }

        self.usage
            .retain(|_, usage| usage.pending != 0 || usage.recording != 0);

        if old_state != state {
            log::trace!("{:?}: {:?} -> {:?}", sequence, old_state, state);
        }
    }
}

pub(crate) fn dangling_reference(object: ObjectId) -> Box<ValidationError> {
    Box::new(ValidationError {
        problem: format!(
            "refers to a `{:?}` that has been destroyed ({:?})",
            object.object_type(),
            object,
        )
        .into(),
        vuids: &[DANGLING_REFERENCE],
        kind: ErrorKind::DanglingReference,
        ..Default::default()
    })
}

/// Returns the rule that forbids destroying an object of the given type while it is in use.
pub(crate) fn destroy_in_use_vuids(object_type: ObjectType) -> &'static [&'static str] {
    match object_type {
        ObjectType::Buffer => &["VUID-vkDestroyBuffer-buffer-00922"],
        ObjectType::BufferView => &["VUID-vkDestroyBufferView-bufferView-00936"],
        ObjectType::Image => &["VUID-vkDestroyImage-image-01000"],
        ObjectType::ImageView => &["VUID-vkDestroyImageView-imageView-01026"],
        ObjectType::Sampler => &["VUID-vkDestroySampler-sampler-01082"],
        ObjectType::RenderPass => &["VUID-vkDestroyRenderPass-renderPass-00873"],
        ObjectType::Framebuffer => &["VUID-vkDestroyFramebuffer-framebuffer-00892"],
        ObjectType::DescriptorSetLayout => {
            &["VUID-vkDestroyDescriptorSetLayout-descriptorSetLayout-00284"]
        }
        ObjectType::DescriptorPool => &["VUID-vkDestroyDescriptorPool-descriptorPool-00303"],
        ObjectType::DescriptorSet => &["VUID-vkFreeDescriptorSets-pDescriptorSets-00309"],
        ObjectType::CommandSequence => &["VUID-vkFreeCommandBuffers-pCommandBuffers-00047"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slotmap::SlotMap;

    fn object(map: &mut SlotMap<()>, object_type: ObjectType) -> ObjectId {
        Id::new(map.insert_with_tag((), object_type as u32))
    }

    #[test]
    fn state_machine() {
        let mut objects = SlotMap::new();
        let buffer = object(&mut objects, ObjectType::Buffer);
        let mut tracker = LifetimeTracker::new();

        let sequence = tracker.begin_sequence();
        assert_eq!(tracker.resource_state(buffer), ResourceState::Live);

        tracker.record_reference(sequence, buffer).unwrap();
        assert_eq!(tracker.resource_state(buffer), ResourceState::ReferencedByRecording);

        tracker.end_sequence(sequence).unwrap();
        tracker.submit(sequence).unwrap();
        assert_eq!(tracker.resource_state(buffer), ResourceState::ReferencedByInFlight);
        assert_eq!(tracker.sequence_state(sequence).unwrap(), SequenceState::Pending);

        tracker.retire(sequence).unwrap();
        assert_eq!(tracker.resource_state(buffer), ResourceState::Live);

        tracker.destroy(buffer).unwrap();
        assert_eq!(tracker.resource_state(buffer), ResourceState::Destroyed);
    }

    #[test]
    fn destroy_in_use() {
        let mut objects = SlotMap::new();
        let image = object(&mut objects, ObjectType::Image);
        let mut tracker = LifetimeTracker::new();

        let sequence = tracker.begin_sequence();
        tracker.record_reference(sequence, image).unwrap();

        let report = tracker.destroy(image).unwrap_err();
        assert!(report.contains("VUID-vkDestroyImage-image-01000"));
        assert_eq!(report.first().unwrap().kind(), ErrorKind::ResourceInUse);
        assert_eq!(tracker.resource_state(image), ResourceState::ReferencedByRecording);
    }

    #[test]
    fn one_pending_user_keeps_object_in_flight() {
        let mut objects = SlotMap::new();
        let buffer = object(&mut objects, ObjectType::Buffer);
        let mut tracker = LifetimeTracker::new();

        let first = tracker.begin_sequence();
        let second = tracker.begin_sequence();

        for sequence in [first, second] {
            tracker.record_reference(sequence, buffer).unwrap();
            tracker.end_sequence(sequence).unwrap();
            tracker.submit(sequence).unwrap();
        }

        tracker.retire(first).unwrap();
        assert_eq!(tracker.resource_state(buffer), ResourceState::ReferencedByInFlight);

        tracker.retire(second).unwrap();
        assert_eq!(tracker.resource_state(buffer), ResourceState::Live);
    }

    #[test]
    fn resubmit_pending() {
        let mut tracker = LifetimeTracker::new();
        let sequence = tracker.begin_sequence();
        tracker.end_sequence(sequence).unwrap();
        tracker.submit(sequence).unwrap();

        let report = tracker.submit(sequence).unwrap_err();
        assert!(report.contains("VUID-vkQueueSubmit-pCommandBuffers-00071"));
    }

    #[test]
    fn record_after_end() {
        let mut objects = SlotMap::new();
        let sampler = object(&mut objects, ObjectType::Sampler);
        let mut tracker = LifetimeTracker::new();
        let sequence = tracker.begin_sequence();
        tracker.end_sequence(sequence).unwrap();

        let report = tracker.record_reference(sequence, sampler).unwrap_err();
        assert!(report.contains(NOT_RECORDING));

        let report = tracker.end_sequence(sequence).unwrap_err();
        assert!(report.contains("VUID-vkEndCommandBuffer-commandBuffer-00059"));
    }

    #[test]
    fn force_destroy_invalidates() {
        let mut objects = SlotMap::new();
        let set = object(&mut objects, ObjectType::DescriptorSet);
        let mut tracker = LifetimeTracker::new();

        let sequence = tracker.begin_sequence();
        tracker.record_reference(sequence, set).unwrap();
        tracker.end_sequence(sequence).unwrap();
        tracker.force_destroy(set);

        assert_eq!(tracker.sequence_state(sequence).unwrap(), SequenceState::Invalidated);
        assert_eq!(tracker.resource_state(set), ResourceState::Destroyed);

        let report = tracker.submit(sequence).unwrap_err();
        assert!(report.contains("VUID-vkQueueSubmit-pCommandBuffers-00070"));
        assert!(report.kinds().all(|kind| kind == ErrorKind::DanglingReference));

        let other = tracker.begin_sequence();
        let report = tracker.record_reference(other, set).unwrap_err();
        assert!(report.contains(DANGLING_REFERENCE));
    }

    #[test]
    fn reset_and_free() {
        let mut objects = SlotMap::new();
        let buffer = object(&mut objects, ObjectType::Buffer);
        let mut tracker = LifetimeTracker::new().with_mode(ValidationMode::CollectAll);

        let sequence = tracker.begin_sequence();
        tracker.record_reference(sequence, buffer).unwrap();
        tracker.end_sequence(sequence).unwrap();
        tracker.submit(sequence).unwrap();

        let report = tracker.reset_sequence(sequence).unwrap_err();
        assert!(report.contains("VUID-vkResetCommandBuffer-commandBuffer-00045"));
        let report = tracker.free_sequence(sequence).unwrap_err();
        assert!(report.contains("VUID-vkFreeCommandBuffers-pCommandBuffers-00047"));

        tracker.retire(sequence).unwrap();
        tracker.reset_sequence(sequence).unwrap();
        assert_eq!(tracker.sequence_state(sequence).unwrap(), SequenceState::Recording);
        assert!(tracker.sequence(sequence).unwrap().references().is_empty());

        tracker.free_sequence(sequence).unwrap();
        assert!(tracker.sequence(sequence).is_err());
    }
}
