// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::fs::File;
use std::io::{Cursor, Read, Stdin};

/// Input a command may consume, e.g. the deployed template `diff` compares
/// against when no `--template` is given.
pub struct Reader {
    inner: ReadBuffer,
}

pub enum ReadBuffer {
    Stdin(Stdin),
    Cursor(Cursor<Vec<u8>>),
    File(File),
}

impl Reader {
    pub fn new(inner: ReadBuffer) -> Self {
        Self { inner }
    }

    pub fn from_content(content: &str) -> Self {
        Self::new(ReadBuffer::Cursor(Cursor::new(content.as_bytes().to_vec())))
    }

    /// Drains the whole input.
    pub fn read_all(&mut self) -> std::io::Result<String> {
        let mut content = String::new();
        self.read_to_string(&mut content)?;
        Ok(content)
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::from_content("")
    }
}

impl Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            ReadBuffer::Stdin(stdin) => stdin.read(buf),
            ReadBuffer::Cursor(cursor) => cursor.read(buf),
            ReadBuffer::File(file) => file.read(buf),
        }
    }
}
