use rand::seq::SliceRandom;

/// Quote shown on the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

pub const QUOTES: &[Quote] = &[
    Quote {
        text: "Единственный способ сделать великую работу — любить то, что ты делаешь.",
        author: "Стив Джобс",
    },
    Quote {
        text: "Не откладывай на завтра то, что можно сделать сегодня.",
        author: "Народная мудрость",
    },
    Quote {
        text: "Маленькие ежедневные улучшения со временем приводят к огромным результатам.",
        author: "Неизвестно",
    },
    Quote {
        text: "Дорогу осилит идущий.",
        author: "Лао-цзы",
    },
    Quote {
        text: "Успех — это способность двигаться от неудачи к неудаче, не теряя энтузиазма.",
        author: "Уинстон Черчилль",
    },
];

/// Short exercises suggested for the break after a session
pub const MICRO_BREAKS: &[&str] = &[
    "Встаньте и потянитесь вверх на 30 секунд",
    "Сделайте 10 медленных вдохов и выдохов",
    "Посмотрите вдаль 20 секунд, чтобы расслабить глаза",
    "Выпейте стакан воды",
    "Сделайте 10 приседаний",
    "Покрутите плечами и разомните шею",
    "Пройдитесь по комнате пару минут",
];

pub fn random_quote() -> Quote {
    QUOTES.choose(&mut rand::thread_rng()).copied().unwrap_or(QUOTES[0])
}

pub fn random_micro_break() -> &'static str {
    MICRO_BREAKS.choose(&mut rand::thread_rng()).copied().unwrap_or(MICRO_BREAKS[0])
}
