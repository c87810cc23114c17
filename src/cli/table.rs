use serde_json::Value;

/// Cap per column so a long bio does not push every other column off screen.
const MAX_COL_WIDTH: usize = 40;

// Render a JSON array of records as an ASCII table.
// Returns None when the value is not a non-empty array; callers fall back to JSON.
pub fn render_records(val: &Value) -> Option<String> {
    let (cols, rows) = columns_and_rows(val)?;
    if rows.is_empty() { return None; }

    let mut widths: Vec<usize> = cols.iter().map(|s| display_len(s).min(MAX_COL_WIDTH)).collect();
    for r in &rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = display_len(cell);
            if w > widths[i] { widths[i] = w.min(MAX_COL_WIDTH); }
        }
    }

    let sep = build_separator(&widths);
    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&build_row(&cols, &widths));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for r in &rows {
        out.push_str(&build_row(r, &widths));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&format!("rows: {}, cols: {}", rows.len(), cols.len()));
    Some(out)
}

// Objects: union of keys across rows, sorted. Scalars: a single "value" column.
fn columns_and_rows(val: &Value) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let Value::Array(arr) = val else { return None; };
    if arr.is_empty() { return Some((Vec::new(), Vec::new())); }

    let mut keys: Vec<String> = Vec::new();
    let all_objects = arr.iter().all(|el| el.is_object());
    if all_objects {
        for el in arr {
            if let Value::Object(map) = el {
                for k in map.keys() { if !keys.contains(k) { keys.push(k.clone()); } }
            }
        }
    }
    if !all_objects || keys.is_empty() {
        let rows = arr.iter().map(|el| vec![to_cell_string(el)]).collect();
        return Some((vec!["value".to_string()], rows));
    }
    keys.sort();
    let rows = arr
        .iter()
        .filter_map(|el| el.as_object())
        .map(|map| keys.iter().map(|k| map.get(k).map(to_cell_string).unwrap_or_default()).collect())
        .collect();
    Some((keys, rows))
}

fn to_cell_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        // nested objects such as batchYear: {year: 2009} stay compact JSON
        other => other.to_string(),
    }
}

fn display_len(s: &str) -> usize { s.chars().count() }

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let text = truncate(&cell, *w);
        let pad = w.saturating_sub(display_len(&text));
        s.push(' ');
        if is_numeric_like(&cell) {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    if st.is_empty() { return false; }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() { has_digit = true; continue; }
        if ".-+eE,_".contains(ch) { continue; }
        return false;
    }
    has_digit
}
