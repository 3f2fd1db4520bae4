use crate::dashboard::DashboardPage;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    view! { <DashboardPage /> }
}
