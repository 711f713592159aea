use super::task::PlannedStep;

/// Keywords that switch the planner to the study template
const ACADEMIC_KEYWORDS: &[&str] = &[
    "экзамен",
    "зачет",
    "зачёт",
    "сессия",
    "курсов",
    "контрольн",
    "диплом",
    "exam",
    "coursework",
    "test prep",
];

const ACADEMIC_TEMPLATE: &[(&str, u32)] = &[
    ("Собрать материалы и список тем", 2),
    ("Изучить теорию", 3),
    ("Сделать конспект ключевых понятий", 2),
    ("Решить практические задания", 3),
    ("Пройти пробный тест", 2),
];

const GENERIC_TEMPLATE: &[(&str, u32)] = &[
    ("Разобраться в задаче и составить план", 1),
    ("Выполнить основную часть", 3),
    ("Проверить и доработать результат", 1),
];

/// Check whether a description reads like exam or coursework preparation
pub fn is_academic(description: &str) -> bool {
    let lowered = description.to_lowercase();
    ACADEMIC_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Break a task description into a canned list of steps
pub fn plan_subtasks(description: &str) -> Vec<PlannedStep> {
    let template = if is_academic(description) {
        ACADEMIC_TEMPLATE
    } else {
        GENERIC_TEMPLATE
    };
    template
        .iter()
        .map(|(title, estimate)| PlannedStep::new(*title, *estimate))
        .collect()
}

/// Total pomodoros of a plan
pub fn plan_total(plan: &[PlannedStep]) -> u32 {
    plan.iter().map(|s| s.estimated_pomodoros).sum()
}
