use leads_engine::{
    save_csv_download, DownloadSettings, LeadRow, LeadSource, SampleLeadSource, CSV_MIME_TYPE,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct TaggedSource;

impl LeadSource for TaggedSource {
    fn rows(&self, run_id: &str, limit: u32) -> Vec<LeadRow> {
        (0..limit.min(3))
            .map(|i| LeadRow {
                company: format!("{run_id} #{i}, Inc."),
                email: format!("lead{i}@example.ca"),
                phone: "613-555-0000".to_string(),
                industry: "Retail".to_string(),
                size: "500+".to_string(),
            })
            .collect()
    }
}

fn settings(temp: &TempDir) -> DownloadSettings {
    DownloadSettings {
        dir: temp.path().join("downloads"),
        ..DownloadSettings::default()
    }
}

#[test]
fn sample_download_matches_static_sheet() {
    let temp = TempDir::new().unwrap();
    let saved =
        save_csv_download(&settings(&temp), &SampleLeadSource, "run-1-abc", 1000).unwrap();

    assert_eq!(saved.filename, "ottawa-leads-run-1-abc.csv");
    assert_eq!(saved.mime_type, CSV_MIME_TYPE);
    assert_eq!(saved.rows, 2);
    let content = std::fs::read_to_string(&saved.path).unwrap();
    assert_eq!(
        content,
        "Company,Email,Phone,Industry,Size\n\
         TechCorp Ottawa,contact@techcorp.ca,613-555-0123,Technology,51-200\n\
         Ottawa Health Solutions,info@ohsolutions.ca,613-555-0456,Healthcare,11-50\n"
    );
    assert_eq!(saved.bytes, content.len() as u64);
}

#[test]
fn custom_source_rows_are_quoted_and_limited() {
    let temp = TempDir::new().unwrap();
    let settings = DownloadSettings {
        prefix: "leads".to_string(),
        ..settings(&temp)
    };
    let saved = save_csv_download(&settings, &TaggedSource, "r9", 2).unwrap();

    assert_eq!(saved.filename, "leads-r9.csv");
    assert_eq!(saved.rows, 2);
    let content = std::fs::read_to_string(&saved.path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "\"r9 #0, Inc.\",lead0@example.ca,613-555-0000,Retail,500+"
    );
}
