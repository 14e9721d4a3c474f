use crate::model::EventInstance;
use crate::validate::Issue;
use csv::WriterBuilder;
use std::fs;
use std::path::Path;

/// Export JSON des instances (jolie mise en forme)
pub fn export_instances_json<P: AsRef<Path>>(
    path: P,
    instances: &[EventInstance],
) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(instances)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des instances: header `class_id,title,date,start,end,location`
pub fn export_instances_csv<P: AsRef<Path>>(
    path: P,
    instances: &[EventInstance],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["class_id", "title", "date", "start", "end", "location"])?;
    for instance in instances {
        let date = instance.date.format("%Y-%m-%d").to_string();
        w.write_record([
            instance.class_id.as_deref().unwrap_or(""),
            instance.title.as_str(),
            date.as_str(),
            instance.start_date_time_local.as_str(),
            instance.end_date_time_local.as_str(),
            instance.location.as_deref().unwrap_or(""),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV du rapport de validation: header `path,kind,message`
pub fn export_issues_csv<P: AsRef<Path>>(path: P, issues: &[Issue]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["path", "kind", "message"])?;
    for issue in issues {
        w.write_record([
            issue.path.as_str(),
            issue.kind.code(),
            issue.message.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
