//! HTML rendering for the single page
//!
//! Everything user-supplied goes through [`escape_html`] before it is
//! interpolated.

use churn_common::{ChurnLabel, ValidationError};

use crate::form::PredictionForm;
use crate::history::HistoryEntry;

/// Message shown above the form after a submission
#[derive(Debug, Clone)]
pub enum Banner {
    Prediction {
        label: ChurnLabel,
        display_name: Option<String>,
    },
    InvalidInput(ValidationError),
    ServiceError(String),
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

fn render_banner(banner: &Banner) -> String {
    match banner {
        Banner::Prediction {
            label,
            display_name,
        } => {
            let who = display_name
                .as_deref()
                .map(|name| format!(" ({})", escape_html(name)))
                .unwrap_or_default();
            let (class, advice) = match label {
                ChurnLabel::Churn => (
                    "churn-yes",
                    "Este cliente tem uma alta probabilidade de cancelar o serviço.",
                ),
                ChurnLabel::NoChurn => (
                    "churn-no",
                    "Este cliente provavelmente não cancelará o serviço.",
                ),
            };
            format!(
                r#"<section id="result" class="banner {class}">
    <h2>Resultado da Previsão{who}</h2>
    <p><strong>Previsão de Churn: {label}</strong></p>
    <p>{advice}</p>
</section>"#
            )
        }
        Banner::InvalidInput(err) => {
            let items: String = err
                .fields
                .iter()
                .map(|f| format!("<li>{}</li>", escape_html(&f.to_string())))
                .collect();
            format!(
                r#"<section id="error" class="banner error">
    <h2>Dados inválidos</h2>
    <ul>{items}</ul>
</section>"#
            )
        }
        Banner::ServiceError(message) => format!(
            r#"<section id="error" class="banner error">
    <h2>Não foi possível obter a previsão</h2>
    <p>{}</p>
</section>"#,
            escape_html(message)
        ),
    }
}

fn render_history(history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let rows: String = history
        .iter()
        .map(|entry| {
            let f = &entry.features;
            let plan = if f.international_plan == 1 { "Sim" } else { "Não" };
            format!(
                r#"<tr data-entry-id="{id}">
    <td>{name}</td><td>{plan}</td><td>{day:.2}</td><td>{eve:.2}</td><td>{calls}</td><td>{label}</td>
    <td><form method="post" action="/history/{id}/delete"><button type="submit">Excluir</button></form></td>
</tr>"#,
                id = entry.id,
                name = entry.display_name.as_deref().map(escape_html).unwrap_or_default(),
                plan = plan,
                day = f.total_day_charge,
                eve = f.total_eve_charge,
                calls = f.customer_service_calls,
                label = entry.prediction,
            )
        })
        .collect();

    format!(
        r#"<section id="history">
    <h2>Histórico de Previsões Recentes</h2>
    <table>
        <thead><tr><th>Nome</th><th>Plano Internacional</th><th>Custo Diurno ($)</th><th>Custo Noturno ($)</th><th>Chamadas ao Suporte</th><th>Previsão de Churn</th><th></th></tr></thead>
        <tbody>
{rows}
        </tbody>
    </table>
</section>"#
    )
}

fn selected(value: &PredictionForm, option: &str) -> &'static str {
    if value.international_plan == option {
        " selected"
    } else {
        ""
    }
}

/// Full page: form (pre-filled with `form` when re-rendering after an error),
/// optional banner, history table
pub fn render_page(
    banner: Option<&Banner>,
    history: &[HistoryEntry],
    form: Option<&PredictionForm>,
) -> String {
    let empty = PredictionForm::default();
    let form = form.unwrap_or(&empty);
    let banner = banner.map(render_banner).unwrap_or_default();
    let history = render_history(history);

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Previsão de Churn</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            max-width: 860px;
            margin: 0 auto;
            padding: 20px;
        }}
        h1 {{ color: #4a9eff; }}
        label {{ display: block; margin-top: 12px; }}
        input, select {{ width: 100%; padding: 6px; background: #2a2a2a; color: #e0e0e0; border: 1px solid #3a3a3a; }}
        button {{ margin-top: 12px; padding: 6px 14px; }}
        .banner {{ margin: 20px 0; padding: 12px 16px; border-radius: 6px; }}
        .churn-yes, .error {{ background: #4a1f1f; border: 1px solid #a33; }}
        .churn-no {{ background: #1f3a24; border: 1px solid #3a3; }}
        table {{ width: 100%; border-collapse: collapse; }}
        th, td {{ border-bottom: 1px solid #3a3a3a; padding: 6px; text-align: left; }}
    </style>
</head>
<body>
    <h1>Sistema de Previsão de Churn de Clientes</h1>
    <p>Preencha os dados do cliente para prever se ele está propenso a cancelar o serviço (churn).</p>

    <form id="input_form" method="post" action="/predict">
        <label>Nome (opcional)
            <input type="text" name="display_name" value="{display_name}">
        </label>
        <label>O cliente possui plano internacional?
            <select name="international_plan">
                <option value="Não"{plan_no}>Não</option>
                <option value="Sim"{plan_yes}>Sim</option>
            </select>
        </label>
        <label>Custo total das chamadas diurnas ($)
            <input type="number" name="total_day_charge" min="0" step="0.01" required value="{day}">
        </label>
        <label>Custo total das chamadas noturnas ($)
            <input type="number" name="total_eve_charge" min="0" step="0.01" required value="{eve}">
        </label>
        <label>Nº de chamadas para o atendimento ao cliente
            <input type="number" name="customer_service_calls" min="0" step="1" required value="{calls}">
        </label>
        <button type="submit">Fazer Previsão</button>
    </form>

    {banner}

    {history}
</body>
</html>
"#,
        display_name = escape_html(&form.display_name),
        plan_no = selected(form, "Não"),
        plan_yes = selected(form, "Sim"),
        day = escape_html(&form.total_day_charge),
        eve = escape_html(&form.total_eve_charge),
        calls = escape_html(&form.customer_service_calls),
        banner = banner,
        history = history,
    )
}
