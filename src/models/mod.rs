// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: zones, frames and the processor form.

pub mod frame;
pub mod processor;
pub mod zone;
