// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: zone strings, processor forms, camera frames and the
//! HLS preview.

pub mod media;
pub mod preview;
pub mod serialization;
