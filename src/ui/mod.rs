pub mod breakdown;
pub mod heatmap;
pub mod overview;
pub mod panels;

/// Axis label for a categorical plot axis whose categories sit at 0, 1, 2, ...
/// Grid marks between categories get no label.
pub(crate) fn category_label(labels: &[String], position: f64) -> String {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::category_label;

    #[test]
    fn only_integer_marks_are_labelled() {
        let labels = vec!["Rua A".to_string(), "Rua B".to_string()];
        assert_eq!(category_label(&labels, 1.0), "Rua B");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 2.0), "");
    }
}
