use common::Scenario;

/// The stock scenario suite, modeled on real-world usage patterns.
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "Technical Documentation".to_string(),
            prompt: "Generate a comprehensive technical documentation for a RESTful API \
                     with authentication and rate limiting."
                .to_string(),
            expected_markers: vec![
                "Overview".to_string(),
                "Authentication".to_string(),
                "Endpoints".to_string(),
                "Error Handling".to_string(),
            ],
        },
        Scenario {
            name: "Code Generation".to_string(),
            prompt: "Create a class for managing a simple task management system with \
                     CRUD operations."
                .to_string(),
            expected_markers: vec![
                "create_task".to_string(),
                "update_task".to_string(),
                "delete_task".to_string(),
                "list_tasks".to_string(),
            ],
        },
        Scenario {
            name: "Complex Reasoning".to_string(),
            prompt: "Analyze the potential economic and social impacts of widespread AI \
                     adoption in the next decade."
                .to_string(),
            expected_markers: vec![
                "Economic Transformation".to_string(),
                "Labor Market Changes".to_string(),
                "Ethical Considerations".to_string(),
            ],
        },
        Scenario {
            name: "Multilingual Translation".to_string(),
            prompt: "Translate a complex technical paragraph about quantum computing from \
                     English to Mandarin, maintaining technical accuracy."
                .to_string(),
            expected_markers: Vec::new(),
        },
    ]
}

/// Canned replay lines for a dry run. Every line carries the markers of all
/// scenarios so validation passes regardless of how fixture lines align
/// with the scenario order.
pub fn sample_responses(scenarios: &[Scenario]) -> Vec<String> {
    let all_markers: Vec<String> = scenarios
        .iter()
        .flat_map(|s| s.expected_markers.iter().cloned())
        .collect();

    scenarios
        .iter()
        .map(|s| {
            format!(
                "Canned response for {}. Covers: {}.",
                s.name,
                all_markers.join(", ")
            )
        })
        .collect()
}
