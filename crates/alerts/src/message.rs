use core::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::LowStockItem;

/// A rendered alert, ready for any transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Render the low-stock report.
///
/// Returns `None` when there is nothing to report. Out-of-stock items are
/// listed first; the input order is kept within each group.
pub fn compose_alert(items: &[LowStockItem], generated_at: DateTime<Utc>) -> Option<AlertMessage> {
    if items.is_empty() {
        return None;
    }

    let (out, low): (Vec<&LowStockItem>, Vec<&LowStockItem>) =
        items.iter().partition(|i| i.is_out_of_stock());

    let subject = if out.is_empty() {
        format!("Low stock alert: {} item(s) running low", low.len())
    } else {
        format!(
            "Low stock alert: {} item(s) need attention, {} out of stock",
            items.len(),
            out.len()
        )
    };

    let stamp = generated_at.format("%Y-%m-%d %H:%M UTC");

    let mut text = format!("Low stock report generated {stamp}\n");
    let mut html = format!(
        "<h2>Low stock report</h2>\n<p>Generated {stamp}</p>\n"
    );
    for (title, group) in [("Out of stock", &out), ("Running low", &low)] {
        if group.is_empty() {
            continue;
        }
        text_section(&mut text, title, group);
        html_section(&mut html, title, group);
    }

    Some(AlertMessage {
        subject,
        text_body: text,
        html_body: html,
    })
}

fn text_section(buf: &mut String, title: &str, items: &[&LowStockItem]) {
    let _ = writeln!(buf, "\n{title}:");
    for item in items {
        let _ = writeln!(
            buf,
            "- {} (SKU {}): {} in stock, threshold {}, category {}, bin {}",
            item.name,
            item.sku,
            item.current_stock,
            item.threshold,
            item.category.as_deref().unwrap_or("-"),
            item.bin_location.as_deref().unwrap_or("-"),
        );
    }
}

fn html_section(buf: &mut String, title: &str, items: &[&LowStockItem]) {
    let _ = writeln!(buf, "<h3>{}</h3>", escape(title));
    buf.push_str(
        "<table>\n<tr><th>Name</th><th>SKU</th><th>Stock</th><th>Threshold</th><th>Category</th><th>Bin</th></tr>\n",
    );
    for item in items {
        let _ = writeln!(
            buf,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&item.name),
            escape(&item.sku),
            item.current_stock,
            item.threshold,
            escape(item.category.as_deref().unwrap_or("-")),
            escape(item.bin_location.as_deref().unwrap_or("-")),
        );
    }
    buf.push_str("</table>\n");
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
