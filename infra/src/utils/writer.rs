// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::fs::File;
use std::io::{Stderr, Stdout, Write};
use std::string::FromUtf8Error;

/// Output of a command: a primary buffer for results and a second one for
/// diagnostics. Tests hand in `Vec` buffers and inspect both afterwards.
pub struct Writer {
    buffer: WriteBuffer,
    err: WriteBuffer,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new(WriteBuffer::Vec(vec![]), WriteBuffer::Vec(vec![]))
    }
}

impl Writer {
    pub fn new(buffer: WriteBuffer, err: WriteBuffer) -> Self {
        Self { buffer, err }
    }

    pub fn write_err(&mut self, message: String) -> std::io::Result<()> {
        writeln!(self.err, "{message}")
    }

    pub fn err_to_stripped(&self) -> Result<String, FromUtf8Error> {
        self.err.stripped()
    }

    /// The primary buffer with ANSI colour codes removed.
    pub fn stripped(&self) -> Result<String, FromUtf8Error> {
        self.buffer.stripped()
    }
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.buffer.flush()
    }
}

pub enum WriteBuffer {
    Stdout(Stdout),
    Stderr(Stderr),
    Vec(Vec<u8>),
    File(File),
}

impl WriteBuffer {
    fn stripped(&self) -> Result<String, FromUtf8Error> {
        match self {
            WriteBuffer::Vec(vec) => String::from_utf8(strip_ansi_escapes::strip(vec).unwrap_or_default()),
            _ => Ok(String::new()),
        }
    }
}

impl Write for WriteBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            WriteBuffer::Stdout(stdout) => stdout.write(buf),
            WriteBuffer::Stderr(stderr) => stderr.write(buf),
            WriteBuffer::Vec(vec) => vec.write(buf),
            WriteBuffer::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            WriteBuffer::Stdout(stdout) => stdout.flush(),
            WriteBuffer::Stderr(stderr) => stderr.flush(),
            WriteBuffer::Vec(vec) => vec.flush(),
            WriteBuffer::File(file) => file.flush(),
        }
    }
}
