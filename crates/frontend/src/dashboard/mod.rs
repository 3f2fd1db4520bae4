pub mod widgets;

use crate::pipeline::{self, SortDir, ViewState, PAGE_SIZES};
use crate::shared::api_utils::resolve_api_url;
use crate::shared::export::export_pdf;
use crate::shared::list_utils::get_sort_indicator;
use contracts::record::{NfeControleRecord, COLUMNS};
use gloo_net::http::Request;
use leptos::logging::{error, log};
use leptos::prelude::*;
use widgets::SummaryWidget;

/// Mount-time fetch guard. The dataset is loaded exactly once per page
/// load; a re-entrant mount must not fire a second request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchPhase {
    NotStarted,
    InFlight,
    Done,
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let (records, set_records) = signal::<Vec<NfeControleRecord>>(Vec::new());
    let (loading, set_loading) = signal(false);
    let (error_msg, set_error) = signal::<Option<String>>(None);
    let view_state = RwSignal::new(ViewState::default());

    let fetch_phase = StoredValue::new(FetchPhase::NotStarted);

    let load_records = move || {
        if fetch_phase.get_value() != FetchPhase::NotStarted {
            return;
        }
        fetch_phase.set_value(FetchPhase::InFlight);

        wasm_bindgen_futures::spawn_local(async move {
            set_loading.set(true);
            set_error.set(None);

            let url = resolve_api_url();
            log!("Fetching {}", url);

            match Request::get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if (200..300).contains(&status) {
                        match response.text().await {
                            Ok(text) => {
                                // Non-array payloads degrade to an empty dataset.
                                let list = serde_json::from_str::<Vec<NfeControleRecord>>(&text)
                                    .unwrap_or_default();
                                let received = list.len();
                                let deduped = pipeline::dedupe(list);
                                log!(
                                    "Received {} records, {} after dedupe",
                                    received,
                                    deduped.len()
                                );
                                set_records.set(deduped);
                            }
                            Err(_) => {
                                set_error.set(Some("Erro ao carregar dados.".to_string()));
                            }
                        }
                    } else {
                        set_error.set(Some(format!("Erro na API: {}", status)));
                    }
                }
                Err(e) => {
                    let msg = e.to_string();
                    set_error.set(Some(if msg.is_empty() {
                        "Erro ao carregar dados.".to_string()
                    } else {
                        msg
                    }));
                }
            }

            set_loading.set(false);
            fetch_phase.set_value(FetchPhase::Done);
        });
    };

    // Recomputed on read, no intermediate caches to keep in sync.
    let get_filtered = move || -> Vec<NfeControleRecord> {
        let st = view_state.get();
        pipeline::apply_filters(&records.get(), &st.client_filter, &st.contact_filter)
    };

    let get_sorted = move || -> Vec<NfeControleRecord> {
        let st = view_state.get();
        let mut items = get_filtered();
        pipeline::sort_records(&mut items, &st.sort_key, st.sort_direction);
        items
    };

    let get_page_items = move || -> Vec<NfeControleRecord> {
        let st = view_state.get();
        let sorted = get_sorted();
        let page = st.current_page_safe(sorted.len());
        pipeline::paginate(&sorted, page, st.page_size)
    };

    let toggle_sort =
        move |key: &'static str| move |_| view_state.update(|st| st.toggle_sort(key));

    // The export always takes the full sorted dataset, not the visible page.
    let export_current_view = move |_| {
        if let Err(e) = export_pdf(&get_sorted()) {
            error!("PDF export failed: {}", e);
        }
    };

    load_records();

    view! {
        <div style="max-width: 1280px; margin: 0 auto; padding: 16px; font-family: sans-serif;">
            <header style="display: flex; align-items: flex-start; justify-content: space-between; background: #1f2430; color: white; border-radius: 8px; padding: 16px 20px; margin-bottom: 16px;">
                <div>
                    <div style="font-size: 18px; font-weight: 600;">"NFe | Painel de Controle"</div>
                    <div style="margin-top: 8px; min-width: 260px;">
                        {move || {
                            let filtered = get_filtered();
                            let stats = pipeline::compute_stats(&filtered);
                            let progress = pipeline::overall_progress(&stats, filtered.len());
                            let counter = if progress.total > 0 {
                                format!(" ({}/{})", progress.done, progress.total)
                            } else {
                                String::new()
                            };
                            view! {
                                <div style="font-size: 12px; color: #cfd3dc;">
                                    "Progresso Geral: "
                                    <strong>{format!("{}%", progress.percent_text)}</strong>
                                    {counter}
                                </div>
                                <div style="height: 6px; background: #3a4050; border-radius: 3px; margin-top: 4px; overflow: hidden;">
                                    <div
                                        style="height: 100%; background: #ff6a00;"
                                        style:width=format!("{}%", progress.percent_number)
                                    ></div>
                                </div>
                            }
                        }}
                    </div>
                </div>
                <button
                    on:click=export_current_view
                    style="padding: 8px 16px; background: #ff6a00; color: white; border: none; border-radius: 4px; cursor: pointer; font-size: 14px; font-weight: 600;"
                >
                    "PDF"
                </button>
            </header>

            // Widgets, hidden while loading or on error
            {move || {
                if loading.get() || error_msg.get().is_some() {
                    return view! { <></> }.into_any();
                }
                let filtered = get_filtered();
                let total = filtered.len();
                let stats = pipeline::compute_stats(&filtered);
                view! {
                    <section style="display: flex; gap: 12px; flex-wrap: wrap; margin-bottom: 16px;">
                        <SummaryWidget
                            title="Certificado"
                            value=stats.certificado
                            total=total
                            percent=pipeline::percent_text(stats.certificado, total)
                        />
                        <SummaryWidget
                            title="QR CODE | Homologação"
                            value=stats.qrc_homologacao
                            total=total
                            percent=pipeline::percent_text(stats.qrc_homologacao, total)
                        />
                        <SummaryWidget
                            title="QR CODE | Produção"
                            value=stats.qrc_producao
                            total=total
                            percent=pipeline::percent_text(stats.qrc_producao, total)
                        />
                        <SummaryWidget
                            title="NFCe | Teste"
                            value=stats.teste_cupom
                            total=total
                            percent=pipeline::percent_text(stats.teste_cupom, total)
                        />
                        <SummaryWidget
                            title="NFe | Teste"
                            value=stats.teste_nfse
                            total=total
                            percent=pipeline::percent_text(stats.teste_nfse, total)
                        />
                    </section>
                }
                .into_any()
            }}

            <section style="display: flex; gap: 16px; align-items: flex-end; flex-wrap: wrap; margin-bottom: 16px;">
                <div>
                    <label style="display: block; font-size: 12px; color: #666; margin-bottom: 4px;">
                        "Filtrar por cliente"
                    </label>
                    <input
                        type="text"
                        placeholder="Digite o nome do cliente/unidade..."
                        prop:value=move || view_state.get().client_filter
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            view_state.update(|st| st.set_client_filter(value));
                        }
                        style="width: 260px; padding: 6px 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 14px;"
                    />
                </div>
                <div>
                    <label style="display: block; font-size: 12px; color: #666; margin-bottom: 4px;">
                        "Filtrar por contato"
                    </label>
                    <input
                        type="text"
                        placeholder="Digite o nome do contato..."
                        prop:value=move || view_state.get().contact_filter
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            view_state.update(|st| st.set_contact_filter(value));
                        }
                        style="width: 260px; padding: 6px 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 14px;"
                    />
                </div>
                <button
                    on:click=move |_| view_state.update(|st| st.clear_filters())
                    disabled=move || {
                        let st = view_state.get();
                        st.client_filter.is_empty() && st.contact_filter.is_empty()
                    }
                    style="padding: 6px 12px; background: white; color: #555; border: 1px solid #ccc; border-radius: 4px; cursor: pointer; font-size: 13px;"
                >
                    "Limpar filtros"
                </button>
            </section>

            // Loading / error badges
            {move || {
                if loading.get() {
                    view! {
                        <div style="padding: 12px 16px; background: #f0f4ff; border: 1px solid #c4d2f5; border-radius: 6px; color: #39508a; font-size: 14px; margin-bottom: 16px;">
                            "Carregando..."
                        </div>
                    }
                    .into_any()
                } else if let Some(err) = error_msg.get() {
                    view! {
                        <div style="padding: 12px 16px; background: #fdecea; border: 1px solid #f5c6c0; border-radius: 6px; color: #b00020; font-size: 14px; margin-bottom: 16px;">
                            {format!("Erro ao carregar dados: {}", err)}
                        </div>
                    }
                    .into_any()
                } else {
                    view! { <></> }.into_any()
                }
            }}

            // Table with counters, empty state and pagination footer
            {move || {
                if loading.get() || error_msg.get().is_some() {
                    return view! { <></> }.into_any();
                }

                let st = view_state.get();
                let sorted = get_sorted();
                let total_filtered = sorted.len();
                let grand_total = records.get().len();
                let page_count = st.page_count(total_filtered);
                let current_page = st.current_page_safe(total_filtered);
                let page_items = get_page_items();

                view! {
                    <section style="background: white; border: 1px solid #e0e0e0; border-radius: 8px; padding: 16px;">
                        <div style="display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 8px; margin-bottom: 8px;">
                            <h2 style="margin: 0; font-size: 16px;">"Controle de NFe"</h2>
                            <span style="font-size: 13px; color: #666;">
                                "Itens nesta página: " <strong>{page_items.len()}</strong>
                                " · Filtrados: " <strong>{total_filtered}</strong>
                                " · Total geral: " <strong>{grand_total}</strong>
                            </span>
                        </div>

                        <div style="overflow-x: auto;">
                            <table style="width: 100%; border-collapse: collapse; font-size: 14px;">
                                <thead>
                                    <tr style="background: #f5f5f5;">
                                        {COLUMNS.iter().map(|col| {
                                            let key = col.key;
                                            let align = if col.centered { "center" } else { "left" };
                                            view! {
                                                <th
                                                    style=format!("border: 1px solid #ddd; padding: 8px; cursor: pointer; user-select: none; text-align: {};", align)
                                                    on:click=toggle_sort(key)
                                                >
                                                    {format!(
                                                        "{}{}",
                                                        col.label,
                                                        get_sort_indicator(&st.sort_key, key, st.sort_direction == SortDir::Asc),
                                                    )}
                                                </th>
                                            }
                                        }).collect_view()}
                                    </tr>
                                </thead>
                                <tbody>
                                    {if total_filtered == 0 {
                                        view! {
                                            <tr>
                                                <td colspan="9" style="border: 1px solid #ddd; padding: 16px; text-align: center; color: #888;">
                                                    "Nenhum registro encontrado com os filtros atuais."
                                                </td>
                                            </tr>
                                        }
                                        .into_any()
                                    } else {
                                        page_items.iter().map(|row| {
                                            view! {
                                                <tr>
                                                    {COLUMNS.iter().map(|col| {
                                                        let align = if col.centered { "center" } else { "left" };
                                                        view! {
                                                            <td style=format!("border: 1px solid #ddd; padding: 8px; text-align: {};", align)>
                                                                {row.field(col.key).display()}
                                                            </td>
                                                        }
                                                    }).collect_view()}
                                                </tr>
                                            }
                                        }).collect_view().into_any()
                                    }}
                                </tbody>
                            </table>
                        </div>

                        {if total_filtered > 0 {
                            view! {
                                <div style="display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 8px; margin-top: 12px;">
                                    <div style="display: flex; align-items: center; gap: 8px; font-size: 13px; color: #555;">
                                        <span>"Itens por página:"</span>
                                        <select
                                            on:change=move |ev| {
                                                let size = event_target_value(&ev).parse().unwrap_or(0);
                                                view_state.update(|s| s.set_page_size(size));
                                            }
                                            prop:value=st.page_size.to_string()
                                            style="padding: 4px 8px; border: 1px solid #ddd; border-radius: 4px;"
                                        >
                                            {PAGE_SIZES.iter().map(|&size| view! {
                                                <option value=size.to_string() selected=st.page_size == size>
                                                    {size.to_string()}
                                                </option>
                                            }).collect_view()}
                                        </select>
                                    </div>

                                    <nav style="display: flex; gap: 4px;">
                                        <button
                                            on:click=move |_| view_state.update(|s| s.prev_page())
                                            disabled=current_page == 1
                                            style="padding: 4px 10px; border: 1px solid #ddd; background: white; color: #333; border-radius: 4px; cursor: pointer;"
                                        >
                                            "Anterior"
                                        </button>
                                        {(1..=page_count).map(|page| {
                                            let active = page == current_page;
                                            view! {
                                                <button
                                                    on:click=move |_| view_state.update(|s| s.go_to_page(page))
                                                    style=format!(
                                                        "padding: 4px 10px; border: 1px solid {}; background: {}; color: {}; border-radius: 4px; cursor: pointer;",
                                                        if active { "#ff6a00" } else { "#ddd" },
                                                        if active { "#ff6a00" } else { "white" },
                                                        if active { "white" } else { "#333" },
                                                    )
                                                >
                                                    {page}
                                                </button>
                                            }
                                        }).collect_view()}
                                        <button
                                            on:click=move |_| view_state.update(|s| s.next_page(total_filtered))
                                            disabled=current_page == page_count
                                            style="padding: 4px 10px; border: 1px solid #ddd; background: white; color: #333; border-radius: 4px; cursor: pointer;"
                                        >
                                            "Próxima"
                                        </button>
                                    </nav>
                                </div>
                            }
                            .into_any()
                        } else {
                            view! { <></> }.into_any()
                        }}
                    </section>
                }
                .into_any()
            }}
        </div>
    }
}
