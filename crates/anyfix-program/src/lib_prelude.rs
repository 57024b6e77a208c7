//! Ambient declarations every program sees.
//!
//! A small slice of the standard library: enough globals for realistic
//! snippets (`Number.parseInt`, `Math.max`, `console.log`, `JSON`, `Date`).

pub const LIB_FILE_NAME: &str = "lib.anyfix.d.ts";

pub const LIB_SOURCE: &str = r#"
declare function parseInt(string: string, radix?: number): number;
declare function parseFloat(string: string): number;
declare function isNaN(number: number): boolean;
declare function String(value?: any): string;
declare function Boolean(value?: any): boolean;

interface NumberConstructor {
    parseInt(string: string, radix?: number): number;
    parseFloat(string: string): number;
    isInteger(number: unknown): boolean;
    isFinite(number: unknown): boolean;
    MAX_SAFE_INTEGER: number;
}
declare const Number: NumberConstructor;

interface Math {
    abs(x: number): number;
    floor(x: number): number;
    ceil(x: number): number;
    round(x: number): number;
    max(a: number, b: number): number;
    min(a: number, b: number): number;
    random(): number;
    sqrt(x: number): number;
    PI: number;
}
declare const Math: Math;

interface JSON {
    stringify(value: any): string;
    parse(text: string): any;
}
declare const JSON: JSON;

interface Console {
    log(message?: any): void;
    error(message?: any): void;
}
declare const console: Console;

declare class Date {
    constructor(value?: number | string);
    getTime(): number;
    toISOString(): string;
}
"#;
