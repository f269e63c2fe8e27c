// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Buffers and buffer views.

use crate::{
    capabilities::CapabilitySet, format::Format, report::Halt, DeviceSize, ErrorKind, Id,
    ValidationError, ValidationReport,
};

/// Special value for a range of a buffer, meaning "up to the end of the buffer".
pub const WHOLE_SIZE: DeviceSize = ash::vk::WHOLE_SIZE;

vulkan_bitflags! {
    /// Describes how a buffer is going to be used.
    BufferUsage = BufferUsageFlags(u32);

    /// The buffer can be used as a source for transfer operations.
    TRANSFER_SRC = TRANSFER_SRC,

    /// The buffer can be used as a destination for transfer operations.
    TRANSFER_DST = TRANSFER_DST,

    /// The buffer can be used as a uniform texel buffer.
    UNIFORM_TEXEL_BUFFER = UNIFORM_TEXEL_BUFFER,

    /// The buffer can be used as a storage texel buffer.
    STORAGE_TEXEL_BUFFER = STORAGE_TEXEL_BUFFER,

    /// The buffer can be used as a uniform buffer.
    UNIFORM_BUFFER = UNIFORM_BUFFER,

    /// The buffer can be used as a storage buffer.
    STORAGE_BUFFER = STORAGE_BUFFER,

    /// The buffer can be used as an index buffer.
    INDEX_BUFFER = INDEX_BUFFER,

    /// The buffer can be used as a vertex buffer.
    VERTEX_BUFFER = VERTEX_BUFFER,

    /// The buffer can be used for indirect draw or dispatch parameters.
    INDIRECT_BUFFER = INDIRECT_BUFFER,
}

/// Parameters to create a new `Buffer`.
#[derive(Clone, Debug)]
pub struct BufferCreateInfo {
    /// The size in bytes of the buffer.
    ///
    /// The default value is `0`, which must be overridden.
    pub size: DeviceSize,

    /// How the buffer is going to be used.
    ///
    /// The default value is empty, which must be overridden.
    pub usage: BufferUsage,

    pub _ne: crate::NonExhaustive,
}

impl Default for BufferCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            size: 0,
            usage: BufferUsage::empty(),
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl BufferCreateInfo {
    pub(crate) fn validate(&self, report: &mut ValidationReport) -> Result<(), Halt> {
        if self.size == 0 {
            report.push(Box::new(ValidationError {
                context: "size".into(),
                problem: "is zero".into(),
                vuids: &["VUID-VkBufferCreateInfo-size-00912"],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        if self.usage.is_empty() {
            report.push(Box::new(ValidationError {
                context: "usage".into(),
                problem: "is empty".into(),
                vuids: &["VUID-VkBufferCreateInfo-usage-requiredbitmask"],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        Ok(())
    }
}

/// The properties of a buffer as recorded in the object graph.
#[derive(Clone, Debug)]
pub struct Buffer {
    size: DeviceSize,
    usage: BufferUsage,
}

impl Buffer {
    pub(crate) fn new(create_info: &BufferCreateInfo) -> Self {
        Buffer {
            size: create_info.size,
            usage: create_info.usage,
        }
    }

    /// Returns the size of the buffer in bytes.
    #[inline]
    pub fn size(&self) -> DeviceSize {
        self.size
    }

    /// Returns the usage the buffer was created with.
    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }
}

/// Parameters to create a new `BufferView`.
#[derive(Clone, Debug)]
pub struct BufferViewCreateInfo {
    /// The buffer to create a view of.
    ///
    /// The default value is `Id::INVALID`, which must be overridden.
    pub buffer: Id<Buffer>,

    /// The format of the texels in the view.
    ///
    /// The default value is `Format::UNDEFINED`, which must be overridden.
    pub format: Format,

    /// The offset in bytes from the start of the buffer.
    ///
    /// The default value is `0`.
    pub offset: DeviceSize,

    /// The size in bytes of the view, or `WHOLE_SIZE`.
    ///
    /// The default value is `WHOLE_SIZE`.
    pub range: DeviceSize,

    pub _ne: crate::NonExhaustive,
}

impl Default for BufferViewCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            buffer: Id::INVALID,
            format: Format::UNDEFINED,
            offset: 0,
            range: WHOLE_SIZE,
            _ne: crate::NonExhaustive(()),
        }
    }
}

impl BufferViewCreateInfo {
    pub(crate) fn validate(
        &self,
        capabilities: &CapabilitySet,
        buffer: &Buffer,
        report: &mut ValidationReport,
    ) -> Result<(), Halt> {
        let &Self {
            buffer: _,
            format,
            offset,
            range,
            _ne: _,
        } = self;

        if format == Format::UNDEFINED {
            report.push(Box::new(ValidationError {
                context: "format".into(),
                problem: "is `Format::UNDEFINED`".into(),
                vuids: &["VUID-VkBufferViewCreateInfo-format-parameter"],
                kind: ErrorKind::Structural,
                ..Default::default()
            }))?;
        }

        if !buffer
            .usage
            .intersects(BufferUsage::UNIFORM_TEXEL_BUFFER | BufferUsage::STORAGE_TEXEL_BUFFER)
        {
            report.push(Box::new(ValidationError {
                context: "buffer.usage".into(),
                problem: "does not contain `BufferUsage::UNIFORM_TEXEL_BUFFER` or \
                    `BufferUsage::STORAGE_TEXEL_BUFFER`"
                    .into(),
                vuids: &["VUID-VkBufferViewCreateInfo-buffer-00932"],
                ..Default::default()
            }))?;
        }

        if offset >= buffer.size {
            report.push(Box::new(ValidationError {
                context: "offset".into(),
                problem: "is not less than the size of `buffer`".into(),
                vuids: &["VUID-VkBufferViewCreateInfo-offset-00925"],
                ..Default::default()
            }))?;
        } else if range != WHOLE_SIZE {
            if range == 0 {
                report.push(Box::new(ValidationError {
                    context: "range".into(),
                    problem: "is zero".into(),
                    vuids: &["VUID-VkBufferViewCreateInfo-range-00928"],
                    ..Default::default()
                }))?;
            } else if range > buffer.size - offset {
                report.push(Box::new(ValidationError {
                    problem: "`offset + range` is greater than the size of `buffer`".into(),
                    vuids: &["VUID-VkBufferViewCreateInfo-offset-00931"],
                    ..Default::default()
                }))?;
            }
        }

        let alignment = capabilities.device_limit("min_texel_buffer_offset_alignment");

        if alignment != 0 && offset % alignment != 0 {
            report.push(Box::new(ValidationError {
                context: "offset".into(),
                problem: "is not a multiple of the `min_texel_buffer_offset_alignment` limit"
                    .into(),
                vuids: &["VUID-VkBufferViewCreateInfo-offset-02749"],
                ..Default::default()
            }))?;
        }

        Ok(())
    }
}

/// The properties of a buffer view as recorded in the object graph.
#[derive(Clone, Debug)]
pub struct BufferView {
    buffer: Id<Buffer>,
    format: Format,
    offset: DeviceSize,
    range: DeviceSize,
    usage: BufferUsage,
}

impl BufferView {
    pub(crate) fn new(create_info: &BufferViewCreateInfo, buffer: &Buffer) -> Self {
        let range = if create_info.range == WHOLE_SIZE {
            buffer.size - create_info.offset
        } else {
            create_info.range
        };

        BufferView {
            buffer: create_info.buffer,
            format: create_info.format,
            offset: create_info.offset,
            range,
            usage: buffer.usage,
        }
    }

    /// Returns the buffer the view was created from.
    #[inline]
    pub fn buffer(&self) -> Id<Buffer> {
        self.buffer
    }

    /// Returns the format of the view.
    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the offset of the view in the buffer.
    #[inline]
    pub fn offset(&self) -> DeviceSize {
        self.offset
    }

    /// Returns the size in bytes of the view, with `WHOLE_SIZE` resolved.
    #[inline]
    pub fn range(&self) -> DeviceSize {
        self.range
    }

    /// Returns the usage of the buffer.
    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationMode;

    fn texel_buffer() -> Buffer {
        Buffer::new(&BufferCreateInfo {
            size: 1024,
            usage: BufferUsage::UNIFORM_TEXEL_BUFFER,
            ..Default::default()
        })
    }

    #[test]
    fn whole_size_view() {
        let buffer = texel_buffer();
        let create_info = BufferViewCreateInfo {
            format: Format::R32_UINT,
            offset: 256,
            ..Default::default()
        };

        assert!(ValidationReport::run(ValidationMode::CollectAll, |report| {
            create_info.validate(&CapabilitySet::new(), &buffer, report)
        })
        .is_ok());
        assert_eq!(BufferView::new(&create_info, &buffer).range(), 768);
    }

    #[test]
    fn view_out_of_range() {
        let buffer = texel_buffer();

        let report = ValidationReport::run(ValidationMode::CollectAll, |report| {
            BufferViewCreateInfo {
                format: Format::R32_UINT,
                offset: 512,
                range: 1024,
                ..Default::default()
            }
            .validate(&CapabilitySet::new(), &buffer, report)
        })
        .unwrap_err();
        assert_eq!(
            report.rule_ids().collect::<Vec<_>>(),
            ["VUID-VkBufferViewCreateInfo-offset-00931"],
        );

        let report = ValidationReport::run(ValidationMode::CollectAll, |report| {
            BufferViewCreateInfo {
                format: Format::R32_UINT,
                offset: 100,
                range: 0,
                ..Default::default()
            }
            .validate(&CapabilitySet::new(), &buffer, report)
        })
        .unwrap_err();
        assert!(report.contains("VUID-VkBufferViewCreateInfo-range-00928"));
        assert!(report.contains("VUID-VkBufferViewCreateInfo-offset-02749"));
    }

    #[test]
    fn empty_buffer() {
        let report = ValidationReport::run(ValidationMode::CollectAll, |report| {
            BufferCreateInfo::default().validate(report)
        })
        .unwrap_err();

        assert_eq!(report.len(), 2);
        assert!(report.kinds().all(|kind| kind == ErrorKind::Structural));
    }
}
