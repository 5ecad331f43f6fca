// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Layout, tab bar, footer, palette and inspector helpers used by TUI rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenAreas {
    tabs: Rect,
    canvas: Rect,
    palette: Rect,
    inspector: Rect,
    footer: Rect,
}

impl ScreenAreas {
    fn split(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);
        let sidebar_width = SIDEBAR_WIDTH.min(rows[1].width / 2);
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(sidebar_width)])
            .split(rows[1]);
        let palette_height = PALETTE_HEIGHT.min(panes[1].height / 2);
        let sidebar = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(palette_height), Constraint::Min(0)])
            .split(panes[1]);

        Self {
            tabs: rows[0],
            canvas: panes[0],
            palette: sidebar[0],
            inspector: sidebar[1],
            footer: rows[2],
        }
    }
}

fn rect_contains(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && row >= area.y
        && u32::from(col) < u32::from(area.x) + u32::from(area.width)
        && u32::from(row) < u32::from(area.y) + u32::from(area.height)
}

fn flow_tabs_line(editor: &Editor, theme: &TuiTheme) -> Line<'static> {
    let mut spans = Vec::new();
    for (index, flow) in editor.flows().iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" "));
        }
        let active = index == editor.active_flow_index();
        spans.push(Span::styled(format!(" {} ", flow.name()), theme.tab_style(active)));
    }
    Line::from(spans)
}

fn canvas_title(editor: &Editor, gesture: &Gesture) -> String {
    let flow = editor.active_flow();
    let mode = match gesture {
        Gesture::Idle => String::new(),
        Gesture::DraggingNode(drag) => format!(" · moving {}", drag.node_id()),
        Gesture::Connecting(connect) => format!(
            " · linking from {}:{}",
            connect.source().node_id,
            connect.source().index
        ),
        Gesture::Placing(kind) => format!(" · placing {kind}"),
    };
    format!(
        " {} · {} nodes · {} links{mode} ",
        flow.name(),
        flow.nodes().len(),
        flow.links().len()
    )
}

/// First palette entry shown when `height` rows are available and `selected` must stay visible.
fn palette_offset(selected: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    selected.saturating_sub(height - 1)
}

fn palette_items(
    selected: usize,
    offset: usize,
    height: usize,
    theme: &TuiTheme,
) -> Vec<ListItem<'static>> {
    NodeKind::ALL
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(index, kind)| {
            let marker = if kind.is_infrastructure() { '■' } else { '▪' };
            let item = ListItem::new(format!("{marker} {}", kind.capitalized()));
            if index == selected {
                item.style(theme.selection_style())
            } else {
                item
            }
        })
        .collect()
}

fn inspector_lines(editor: &Editor, theme: &TuiTheme) -> Vec<Line<'static>> {
    let flow = editor.active_flow();

    if let Some(node) = editor.selected_node() {
        let mut lines = vec![
            Line::from(Span::styled(
                node.name().to_owned(),
                theme.node_style(node.status()).add_modifier(Modifier::BOLD),
            )),
            field_line("id", node.id().to_string(), theme),
            field_line("type", node.kind().to_string(), theme),
            field_line(
                "status",
                format!("{} {}", status_glyph(node.status()), node.status().as_str()),
                theme,
            ),
            Line::from(vec![
                Span::styled("health ", theme.label_style()),
                Span::styled(format!("{}%", node.health()), theme.health_style(node.health())),
            ]),
            field_line("pos", format!("{:.0}, {:.0}", node.x(), node.y()), theme),
        ];
        for side in [PortSide::Input, PortSide::Output] {
            let labels: Vec<String> = (0..node.port_count(side))
                .filter_map(|index| port_label(node.port_spec(side), side, index))
                .collect();
            let name = match side {
                PortSide::Input => "in",
                PortSide::Output => "out",
            };
            lines.push(field_line(name, labels.join(", "), theme));
        }
        if !node.properties().is_empty() {
            lines.push(Line::from(Span::styled("properties", theme.label_style())));
            for (key, value) in node.properties() {
                let value = match value {
                    serde_json::Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                lines.push(Line::from(format!("  {key} = {value}")));
            }
        }
        return lines;
    }

    if let Some(link) = editor.selected_link_id().and_then(|link_id| flow.link(link_id)) {
        return vec![
            Line::from(Span::styled(
                link.id().to_string(),
                theme.link_style(link.status()).add_modifier(Modifier::BOLD),
            )),
            field_line("from", link.source().to_string(), theme),
            field_line("to", link.target().to_string(), theme),
            field_line("type", link.kind().as_str().to_owned(), theme),
            field_line("status", link.status().as_str().to_owned(), theme),
        ];
    }

    vec![
        Line::from(Span::styled(
            flow.name().to_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        field_line("id", flow.id().to_string(), theme),
        field_line("nodes", flow.nodes().len().to_string(), theme),
        field_line("links", flow.links().len().to_string(), theme),
        Line::from(Span::styled("nothing selected", theme.label_style())),
    ]
}

fn field_line(label: &str, value: String, theme: &TuiTheme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label} "), theme.label_style()),
        Span::raw(value),
    ])
}

const FOOTER_HINTS: &[(&str, &str)] = &[
    ("a", "add"),
    ("d", "del"),
    ("[]", "kind"),
    ("n", "flow"),
    ("s", "save"),
    ("e", "export"),
    ("i", "import"),
    ("+-", "zoom"),
    ("q", "quit"),
];

fn footer_help_line(editor: &Editor, theme: &TuiTheme) -> Line<'static> {
    let mut spans = vec![Span::raw(format!("{} ", editor.zoom()))];
    if editor.has_changes() {
        spans.push(Span::styled("● unsaved ", theme.dirty_style()));
    }
    spans.push(Span::styled("│ ", theme.label_style()));
    for (key, label) in FOOTER_HINTS {
        spans.push(Span::styled((*key).to_owned(), theme.key_style()));
        spans.push(Span::styled(format!(" {label}  "), theme.label_style()));
    }
    Line::from(spans)
}
