use leptos::prelude::*;

/// One summary card: truthy count over the filtered total, percent text and
/// a proportional fill bar.
#[component]
pub fn SummaryWidget(
    title: &'static str,
    value: usize,
    total: usize,
    percent: String,
) -> impl IntoView {
    let fill = if total > 0 {
        value as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    view! {
        <article style="background: white; border: 1px solid #e0e0e0; border-radius: 6px; padding: 14px; flex: 1; min-width: 170px;">
            <h3 style="margin: 0 0 6px 0; font-size: 14px; color: #555;">{title}</h3>
            <p style="margin: 0; font-size: 24px; font-weight: 600;">
                {value} <span style="font-size: 14px; color: #999;">" / " {total}</span>
            </p>
            <p style="margin: 4px 0 8px 0; font-size: 12px; color: #888;">
                {format!("{}% dos registros", percent)}
            </p>
            <div style="height: 6px; background: #eee; border-radius: 3px; overflow: hidden;">
                <div
                    style="height: 100%; background: #ff6a00;"
                    style:width=format!("{}%", fill)
                ></div>
            </div>
        </article>
    }
}
