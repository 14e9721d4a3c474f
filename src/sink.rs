use crate::model::EventInstance;
use anyhow::{bail, Result};
use chrono::NaiveDate;

/// Agenda textuel d'une journée, prêt à partir vers un puits calendrier.
#[derive(Debug, Clone)]
pub struct Agenda {
    pub date: NaiveDate,
    pub entries: usize,
    pub content: String,
}

/// Permet de customiser le rendu d'une ligne d'agenda (texte, mail, etc.).
pub trait AgendaRenderer {
    fn render(&self, instance: &EventInstance) -> String;
}

/// Gabarit texte simple destiné à un affichage terminal ou un futur mail.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextAgenda;

impl AgendaRenderer for TextAgenda {
    fn render(&self, instance: &EventInstance) -> String {
        // Les horodatages matérialisés sont à largeur fixe ; 11..16 isole HH:MM.
        let start = instance
            .start_date_time_local
            .get(11..16)
            .unwrap_or(&instance.start_date_time_local);
        let end = instance
            .end_date_time_local
            .get(11..16)
            .unwrap_or(&instance.end_date_time_local);
        let mut line = format!("{start}–{end}  {}", instance.title);
        if let Some(location) = &instance.location {
            line.push_str(&format!(" ({location})"));
        }
        line
    }
}

/// Prépare l'agenda d'une journée à partir d'instances déjà déployées.
pub fn prepare_agenda(
    instances: &[EventInstance],
    on: NaiveDate,
    renderer: &dyn AgendaRenderer,
) -> Result<Agenda> {
    let mut day: Vec<&EventInstance> = instances.iter().filter(|i| i.date == on).collect();
    if day.is_empty() {
        bail!("no occurrence on {on}");
    }
    day.sort_by(|a, b| a.start_date_time_local.cmp(&b.start_date_time_local));

    let mut lines = Vec::with_capacity(day.len() + 1);
    lines.push(format!("Agenda du {} :", on.format("%Y-%m-%d")));
    for instance in &day {
        lines.push(format!("- {}", renderer.render(instance)));
    }
    let mut content = lines.join("\n");
    content.push('\n');

    Ok(Agenda {
        date: on,
        entries: day.len(),
        content,
    })
}
