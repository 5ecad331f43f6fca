// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! JSON exchange for flows.
//!
//! Import accepts either a bare node array or `{ "nodes": [...], "links": [...] }`; export always
//! writes the object form to `graph_export.json`.

pub mod exchange;

pub use exchange::{
    parse_import, read_import, write_export, ExportDocument, ExportError, ImportBatch,
    ImportError, ImportedNode, LinkRecord, NodeRecord, PortSpecRecord, EXPORT_FILE_NAME,
};
