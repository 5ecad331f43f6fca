// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowdeck: a terminal editor for infrastructure flow graphs.
//!
//! Flows hold nodes with typed input/output ports and links between those ports. The [`ops`]
//! editor is the only writer; [`interaction`] turns pointer gestures into editor calls and
//! [`render`] rasterizes the active flow for the [`tui`] shell.

pub mod config;
pub mod geometry;
pub mod interaction;
pub mod model;
pub mod ops;
pub mod render;
pub mod store;
pub mod tui;
