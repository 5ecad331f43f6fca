// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;

use ratatui::style::{Color, Modifier, Style};

use crate::model::{LinkStatus, NodeStatus, PortSide};

/// Health above this is shown green.
const HEALTH_GOOD: u8 = 80;
/// Health above this (and not above `HEALTH_GOOD`) is shown yellow; the rest red.
const HEALTH_FAIR: u8 = 60;

#[derive(Debug, Clone, Default)]
pub(crate) struct TuiTheme {
    monochrome: bool,
}

impl TuiTheme {
    /// Honors `NO_COLOR`: any non-empty value drops colors but keeps modifiers.
    pub(crate) fn from_env() -> Self {
        let monochrome = env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
        Self { monochrome }
    }

    pub(crate) fn monochrome() -> Self {
        Self { monochrome: true }
    }

    fn fg(&self, color: Color) -> Style {
        if self.monochrome {
            Style::default()
        } else {
            Style::default().fg(color)
        }
    }

    pub(crate) fn panel_border_style(&self, focused: bool) -> Style {
        if focused {
            self.fg(Color::LightGreen)
        } else {
            self.fg(Color::DarkGray)
        }
    }

    pub(crate) fn link_style(&self, status: LinkStatus) -> Style {
        match status {
            LinkStatus::Active => self.fg(Color::Cyan),
            LinkStatus::Inactive => self.fg(Color::DarkGray).add_modifier(Modifier::DIM),
            LinkStatus::Error => self.fg(Color::Red),
        }
    }

    pub(crate) fn node_style(&self, status: NodeStatus) -> Style {
        match status {
            NodeStatus::Healthy => self.fg(Color::White),
            NodeStatus::Warning => self.fg(Color::Yellow),
            NodeStatus::Critical => self.fg(Color::LightRed),
            NodeStatus::Unknown => self.fg(Color::Gray),
        }
    }

    pub(crate) fn health_style(&self, health: u8) -> Style {
        self.fg(health_color(health))
    }

    pub(crate) fn port_style(&self, side: PortSide) -> Style {
        match side {
            PortSide::Input => self.fg(Color::LightBlue),
            PortSide::Output => self.fg(Color::LightMagenta),
        }
        .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn preview_style(&self, valid: Option<bool>) -> Style {
        match valid {
            Some(true) => self.fg(Color::LightGreen).add_modifier(Modifier::BOLD),
            Some(false) => self.fg(Color::LightRed).add_modifier(Modifier::BOLD),
            None => self.fg(Color::Gray),
        }
    }

    pub(crate) fn selection_style(&self) -> Style {
        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    }

    pub(crate) fn tab_style(&self, active: bool) -> Style {
        if active {
            self.fg(Color::Black)
                .bg(if self.monochrome { Color::Reset } else { Color::LightGreen })
                .add_modifier(Modifier::BOLD)
        } else {
            self.fg(Color::Gray)
        }
    }

    pub(crate) fn key_style(&self) -> Style {
        self.fg(Color::Cyan)
    }

    pub(crate) fn label_style(&self) -> Style {
        self.fg(Color::Gray)
    }

    pub(crate) fn dirty_style(&self) -> Style {
        self.fg(Color::Yellow).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn error_style(&self) -> Style {
        self.fg(Color::Red)
    }
}

pub(crate) fn health_color(health: u8) -> Color {
    if health > HEALTH_GOOD {
        Color::Green
    } else if health > HEALTH_FAIR {
        Color::Yellow
    } else {
        Color::Red
    }
}
